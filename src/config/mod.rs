// src/config/mod.rs

//! Startup configuration for monohook.
//!
//! Responsibilities:
//! - Define the plain, already-validated values the core runs with (`model.rs`).
//! - Turn parsed CLI arguments into that model (`validate.rs`).
//! - Resolve the command to an absolute executable path (`resolve.rs`).

pub mod model;
pub mod resolve;
pub mod validate;

pub use model::{ForwardOptions, HookConfig};
pub use resolve::find_executable;
