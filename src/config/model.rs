// src/config/model.rs

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::{ConcurrencyMode, DenyStatus};

/// Which parts of a trigger request are handed to the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardOptions {
    /// Stream the request body to the command's standard input.
    pub body: bool,
    /// Expose every header as `MONOHOOK_REQUEST_HEADER_<NAME>`.
    pub headers: bool,
    /// Expose the request URL as `MONOHOOK_REQUEST_URL`.
    pub url: bool,
}

/// Fully resolved configuration.
///
/// Built once at startup from [`crate::cli::CliArgs`] (see `validate.rs`); by
/// the time a `HookConfig` exists the command has been found on disk and every
/// value has been checked.
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Shared secret; `None` disables authorization entirely.
    pub auth_token: Option<String>,
    /// Admission queue capacity, 0 = unbounded.
    pub queue_capacity: usize,
    /// Concurrency ceiling, 0 = unbounded.
    pub concurrency: usize,
    pub concurrency_mode: ConcurrencyMode,
    pub cwd: Option<PathBuf>,
    pub forward: ForwardOptions,
    pub port: u16,
    pub deny_status: DenyStatus,
    pub request_timeout: Duration,
    /// Absolute path of the executable.
    pub command: PathBuf,
    pub args: Vec<String>,
}

impl HookConfig {
    /// Address the HTTP server binds to (all interfaces).
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
