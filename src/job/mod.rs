// src/job/mod.rs

//! Job model: one command invocation derived from one accepted trigger request.
//!
//! - [`builder`] turns an HTTP request into a [`Job`] and, when body forwarding
//!   is enabled, the [`BodySink`] that feeds the job's standard input.

pub mod builder;

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tokio::io::DuplexStream;

pub use builder::{header_env_key, BodySink, JobBuilder, HEADER_ENV_PREFIX, URL_ENV_VAR};

/// Read end of the pipe carrying a request body to the command's stdin.
pub type JobInput = DuplexStream;

/// Everything needed to run the command once.
///
/// A job has a single owner at any time (handler, queue, scheduler, invoker)
/// and is consumed by the invocation that runs it.
#[derive(Debug)]
pub struct Job {
    /// Absolute path of the executable.
    pub command: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Environment entries in order. Later entries override earlier ones with
    /// the same name.
    pub env: Vec<(OsString, OsString)>,
    pub input: Option<JobInput>,
}

impl Job {
    /// Look up an environment variable the way the child will see it
    /// (last matching entry wins).
    pub fn env_var(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
        let name = name.as_ref();
        self.env
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_os_str())
    }

    /// Human-readable command name for diagnostics.
    pub fn display_command(&self) -> String {
        self.command.display().to_string()
    }
}

/// A job that has been admitted to the queue.
#[derive(Debug)]
pub struct QueuedJob {
    /// Admission order, starting at 1 and strictly increasing.
    pub seq: u64,
    pub job: Job,
}
