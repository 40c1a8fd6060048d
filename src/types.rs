// src/types.rs

use std::fmt;

use axum::http::StatusCode;
use clap::ValueEnum;

/// How the concurrency ceiling is enforced when it is greater than zero.
///
/// - `Batch`: dispatch up to K invocations, then wait until *all* of them have
///   completed before dispatching the next one (default behaviour).
/// - `Window`: start a new invocation as soon as any of the K slots frees up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConcurrencyMode {
    Batch,
    Window,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Batch
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::Batch => f.write_str("batch"),
            ConcurrencyMode::Window => f.write_str("window"),
        }
    }
}

/// Status answered to requests that fail authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DenyStatus {
    #[value(name = "401")]
    Unauthorized,
    #[value(name = "403")]
    Forbidden,
}

impl Default for DenyStatus {
    fn default() -> Self {
        DenyStatus::Unauthorized
    }
}

impl DenyStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            DenyStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            DenyStatus::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}
