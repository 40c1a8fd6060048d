// src/engine/gate.rs

//! Pure bookkeeping for the batched concurrency gate.
//!
//! The gate counts invocations dispatched since the last reset. Once the count
//! reaches the ceiling the scheduler must wait for the *whole* batch to finish
//! and then call [`BatchGate::reset`]. No Tokio types live here so the state
//! machine can be tested synchronously.

/// Where the current batch stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Nothing dispatched since the last reset.
    Idle,
    /// Some invocations dispatched, more may start.
    Filling,
    /// The batch is full; wait for every member before dispatching again.
    AtCapacity,
}

#[derive(Debug, Clone)]
pub struct BatchGate {
    ceiling: usize,
    running: usize,
}

impl BatchGate {
    /// `ceiling` must be at least 1; a zero ceiling is treated as 1.
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling: ceiling.max(1),
            running: 0,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Invocations counted against the current batch.
    pub fn running(&self) -> usize {
        self.running
    }

    pub fn state(&self) -> GateState {
        if self.running == 0 {
            GateState::Idle
        } else if self.running >= self.ceiling {
            GateState::AtCapacity
        } else {
            GateState::Filling
        }
    }

    /// Whether another invocation may be dispatched right now.
    pub fn can_dispatch(&self) -> bool {
        self.state() != GateState::AtCapacity
    }

    /// Count one dispatched invocation and return the resulting state.
    pub fn record_dispatch(&mut self) -> GateState {
        debug_assert!(self.can_dispatch(), "dispatch past a full batch");
        self.running += 1;
        self.state()
    }

    /// The whole batch has completed.
    pub fn reset(&mut self) {
        self.running = 0;
    }
}
