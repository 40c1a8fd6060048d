// src/engine/mod.rs

//! Admission and scheduling engine for monohook.
//!
//! This module ties together:
//! - the bounded admission queue fed by the HTTP handlers ([`queue`])
//! - the pure batch-gate state machine ([`gate`])
//! - the execution worker loop that drains the queue and dispatches jobs to
//!   an [`crate::exec::Invoker`] under a concurrency budget ([`scheduler`])

pub mod gate;
pub mod queue;
pub mod scheduler;

pub use gate::{BatchGate, GateState};
pub use queue::{admission_queue, Admission, AdmissionQueue, AdmissionReceiver};
pub use scheduler::{ConcurrencyBudget, Scheduler, SchedulerReport};
pub use crate::types::ConcurrencyMode;
