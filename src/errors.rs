// src/errors.rs

//! Crate-wide error type and exit codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonohookError {
    /// Bad invocation: missing command, stray positional arguments, unknown flags.
    #[error("{0}")]
    InvalidArguments(String),

    /// An option (flag or `MONOHOOK_*` variable) has a malformed value.
    #[error("{0}")]
    InvalidOption(String),

    #[error("could not find command \"{0}\"")]
    CommandNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonohookError {
    /// Process exit code for a fatal startup error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MonohookError::InvalidArguments(_) => 1,
            MonohookError::CommandNotFound(_) => 2,
            MonohookError::InvalidOption(_) => 3,
            MonohookError::IoError(_) | MonohookError::Other(_) => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MonohookError>;
