// src/engine/scheduler.rs

//! The execution worker: the single consumer of the admission queue.
//!
//! The loop dequeues jobs in FIFO order and hands each one to the
//! [`Invoker`] in its own Tokio task. How many may run at once depends on the
//! [`ConcurrencyBudget`]:
//!
//! - ceiling 0: every job starts immediately.
//! - `batch` mode: up to K jobs start, then the loop waits for all of them to
//!   finish before dequeuing again (see [`BatchGate`]).
//! - `window` mode: a new job starts as soon as any running one finishes.
//!
//! Dispatching never waits on the invocation itself; only the gate does.

use std::fmt;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::engine::gate::{BatchGate, GateState};
use crate::engine::queue::AdmissionReceiver;
use crate::exec::{InvocationOutcome, Invoker};
use crate::job::QueuedJob;
use crate::types::ConcurrencyMode;

/// Ceiling on simultaneous invocations and how it is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyBudget {
    /// 0 = unbounded.
    pub ceiling: usize,
    pub mode: ConcurrencyMode,
}

impl ConcurrencyBudget {
    pub fn new(ceiling: usize, mode: ConcurrencyMode) -> Self {
        Self { ceiling, mode }
    }

    pub fn unbounded() -> Self {
        Self::new(0, ConcurrencyMode::default())
    }

    pub fn is_unbounded(&self) -> bool {
        self.ceiling == 0
    }
}

/// Totals observed by the scheduler over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl SchedulerReport {
    fn record(&mut self, result: Result<InvocationOutcome, JoinError>) {
        match result {
            Ok(outcome) if outcome.is_success() => self.succeeded += 1,
            Ok(_) => self.failed += 1,
            Err(err) => {
                error!(error = %err, "invocation task panicked");
                self.failed += 1;
            }
        }
    }
}

enum Gate {
    Unbounded,
    Batch(BatchGate),
    Window(usize),
}

impl Gate {
    fn for_budget(budget: ConcurrencyBudget) -> Self {
        if budget.is_unbounded() {
            return Gate::Unbounded;
        }
        match budget.mode {
            ConcurrencyMode::Batch => Gate::Batch(BatchGate::new(budget.ceiling)),
            ConcurrencyMode::Window => Gate::Window(budget.ceiling),
        }
    }
}

pub struct Scheduler<I: Invoker> {
    queue: AdmissionReceiver,
    invoker: I,
    budget: ConcurrencyBudget,
}

impl<I: Invoker> fmt::Debug for Scheduler<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("queued", &self.queue.len())
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

impl<I: Invoker> Scheduler<I> {
    pub fn new(queue: AdmissionReceiver, invoker: I, budget: ConcurrencyBudget) -> Self {
        Self {
            queue,
            invoker,
            budget,
        }
    }

    /// Main dispatch loop.
    ///
    /// Runs until every producer handle of the queue is dropped, then waits
    /// for in-flight invocations and returns what it observed.
    pub async fn run(mut self) -> SchedulerReport {
        info!(
            ceiling = self.budget.ceiling,
            mode = %self.budget.mode,
            "execution worker started"
        );

        let mut gate = Gate::for_budget(self.budget);
        let mut inflight: JoinSet<InvocationOutcome> = JoinSet::new();
        let mut report = SchedulerReport::default();

        while let Some(job) = self.queue.dequeue().await {
            while let Some(result) = inflight.try_join_next() {
                report.record(result);
            }

            match gate {
                Gate::Unbounded => {
                    self.dispatch(&mut inflight, job, &mut report);
                }
                Gate::Window(limit) => {
                    while inflight.len() >= limit {
                        match inflight.join_next().await {
                            Some(result) => report.record(result),
                            None => break,
                        }
                    }
                    self.dispatch(&mut inflight, job, &mut report);
                }
                Gate::Batch(ref mut batch) => {
                    self.dispatch(&mut inflight, job, &mut report);
                    if batch.record_dispatch() == GateState::AtCapacity {
                        debug!(
                            running = batch.running(),
                            "batch full; waiting for every invocation to finish"
                        );
                        drain(&mut inflight, &mut report).await;
                        batch.reset();
                    }
                }
            }
        }

        info!(running = inflight.len(), "queue closed; waiting for running commands");
        drain(&mut inflight, &mut report).await;

        info!(
            dispatched = report.dispatched,
            succeeded = report.succeeded,
            failed = report.failed,
            "execution worker stopped"
        );
        report
    }

    fn dispatch(
        &self,
        inflight: &mut JoinSet<InvocationOutcome>,
        job: QueuedJob,
        report: &mut SchedulerReport,
    ) {
        debug!(seq = job.seq, running = inflight.len(), "dispatching job");
        let invoker = self.invoker.clone();
        inflight.spawn(async move { invoker.invoke(job).await });
        report.dispatched += 1;
    }
}

async fn drain(inflight: &mut JoinSet<InvocationOutcome>, report: &mut SchedulerReport) {
    while let Some(result) = inflight.join_next().await {
        report.record(result);
    }
}
