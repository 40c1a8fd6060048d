// src/exec/backend.rs

//! Pluggable invocation backend.
//!
//! The scheduler talks to an `Invoker` instead of spawning processes itself.
//! Production code uses [`super::command::CommandInvoker`]; tests provide
//! invokers that record jobs and control when they complete.

use std::future::Future;
use std::pin::Pin;

use crate::job::QueuedJob;

/// Outcome of one invocation, for observation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The command exited with status 0.
    Success,
    /// The command exited with a non-zero status (-1 when killed by a signal).
    Failed(i32),
    /// The command could not be spawned or waited on.
    Error,
}

impl InvocationOutcome {
    pub fn is_success(self) -> bool {
        self == InvocationOutcome::Success
    }
}

/// Runs one job to completion.
///
/// Implementations must not fail: every problem is reported through the
/// returned outcome (and logged). The returned future resolving is the
/// completion signal the scheduler waits on.
pub trait Invoker: Clone + Send + Sync + 'static {
    fn invoke(
        &self,
        job: QueuedJob,
    ) -> Pin<Box<dyn Future<Output = InvocationOutcome> + Send + '_>>;
}
