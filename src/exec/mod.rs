// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the configured command,
//! using `tokio::process::Command`, once per dispatched job.
//!
//! - [`backend`] provides the `Invoker` trait the scheduler dispatches through,
//!   so tests can swap in a fake that doesn't spawn processes.
//! - [`command`] holds `CommandInvoker`, the production implementation.

pub mod backend;
pub mod command;

pub use backend::{InvocationOutcome, Invoker};
pub use command::CommandInvoker;
