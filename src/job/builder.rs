// src/job/builder.rs

//! Build a [`Job`] from an authorized trigger request.

use std::ffi::OsString;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Uri};
use futures::TryStreamExt;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::config::{ForwardOptions, HookConfig};
use crate::job::Job;

/// Prefix shared by every header-derived environment variable.
pub const HEADER_ENV_PREFIX: &str = "MONOHOOK_REQUEST_HEADER_";

/// Environment variable carrying the request URL.
pub const URL_ENV_VAR: &str = "MONOHOOK_REQUEST_URL";

/// In-memory buffer between the request body and the command's stdin.
const BODY_PIPE_CAPACITY: usize = 64 * 1024;

/// Environment key for a request header: `Content-Type` becomes
/// `MONOHOOK_REQUEST_HEADER_CONTENT_TYPE`.
pub fn header_env_key(header_name: &str) -> String {
    let mut key = String::with_capacity(HEADER_ENV_PREFIX.len() + header_name.len());
    key.push_str(HEADER_ENV_PREFIX);
    key.extend(header_name.chars().map(|c| match c {
        '-' => '_',
        other => other.to_ascii_uppercase(),
    }));
    key
}

/// Turns requests into jobs using the static parts of the configuration.
///
/// The base environment is captured once when the builder is created.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    command: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    forward: ForwardOptions,
    base_env: Arc<Vec<(OsString, OsString)>>,
}

impl JobBuilder {
    pub fn new(
        command: PathBuf,
        args: Vec<String>,
        cwd: Option<PathBuf>,
        forward: ForwardOptions,
    ) -> Self {
        Self {
            command,
            args,
            cwd,
            forward,
            base_env: Arc::new(std::env::vars_os().collect()),
        }
    }

    pub fn from_config(cfg: &HookConfig) -> Self {
        Self::new(
            cfg.command.clone(),
            cfg.args.clone(),
            cfg.cwd.clone(),
            cfg.forward,
        )
    }

    /// Replace the inherited environment (used by tests).
    pub fn with_base_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.base_env = Arc::new(env.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Build the job for one request.
    ///
    /// Returns the sink for the request body when body forwarding is enabled;
    /// the caller must only start [`BodySink::forward`] once the job has been
    /// admitted.
    pub fn build(&self, uri: &Uri, headers: &HeaderMap) -> (Job, Option<BodySink>) {
        let mut env = Vec::with_capacity(self.base_env.len() + headers.keys_len() + 1);
        env.extend(self.base_env.iter().cloned());

        if self.forward.headers {
            for name in headers.keys() {
                let joined = headers
                    .get_all(name)
                    .iter()
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                env.push((header_env_key(name.as_str()).into(), joined.into()));
            }
        }

        if self.forward.url {
            env.push((URL_ENV_VAR.into(), uri.to_string().into()));
        }

        let (input, sink) = if self.forward.body {
            let (reader, writer) = tokio::io::duplex(BODY_PIPE_CAPACITY);
            (Some(reader), Some(BodySink { writer }))
        } else {
            (None, None)
        };

        let job = Job {
            command: self.command.clone(),
            args: self.args.clone(),
            cwd: self.cwd.clone(),
            env,
            input,
        };

        (job, sink)
    }
}

/// Write end of a job's stdin pipe.
#[derive(Debug)]
pub struct BodySink {
    writer: DuplexStream,
}

impl BodySink {
    /// Stream `body` into the pipe, then close it.
    ///
    /// Stops early (without error) if the client goes away or the command's
    /// side of the pipe is closed.
    pub async fn forward(mut self, body: Body) {
        let stream = body.into_data_stream().map_err(std::io::Error::other);
        let mut reader = pin!(StreamReader::new(stream));

        match tokio::io::copy(&mut reader, &mut self.writer).await {
            Ok(bytes) => debug!(bytes, "request body forwarded to command input"),
            Err(err) => debug!(error = %err, "request body forwarding stopped early"),
        }

        if let Err(err) = self.writer.shutdown().await {
            debug!(error = %err, "closing command input pipe");
        }
    }
}
