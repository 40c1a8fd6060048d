// src/engine/queue.rs

//! Bounded admission queue between the HTTP handlers and the scheduler.
//!
//! Semantics:
//! - Producers (request handlers) call [`AdmissionQueue::try_enqueue`], which
//!   never waits: the job is either appended or refused on the spot.
//! - A capacity of 0 means the queue is unbounded and never refuses.
//! - Each admitted job gets a sequence number; numbering and the capacity
//!   checked push happen under one lock, so queue order equals numbering order.
//! - The single consumer (the scheduler) calls [`AdmissionReceiver::dequeue`],
//!   which yields jobs in FIFO order and returns `None` once every producer
//!   handle has been dropped and the queue is drained.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::job::{Job, QueuedJob};

/// Result of a non-blocking enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The job was appended with this sequence number.
    Accepted(u64),
    /// The queue is full; the job was dropped.
    Refused,
    /// The consumer is gone; the job was dropped.
    Closed,
}

enum QueueSender {
    Bounded(mpsc::Sender<QueuedJob>),
    Unbounded(mpsc::UnboundedSender<QueuedJob>),
}

enum QueueReceiver {
    Bounded(mpsc::Receiver<QueuedJob>),
    Unbounded(mpsc::UnboundedReceiver<QueuedJob>),
}

struct Producer {
    sender: QueueSender,
    /// Sequence number of the last admitted job.
    last_seq: u64,
}

/// Producer handle, cheap to clone and shared by every request handler.
#[derive(Clone)]
pub struct AdmissionQueue {
    producer: Arc<Mutex<Producer>>,
    capacity: usize,
}

impl fmt::Debug for AdmissionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionQueue")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Consumer handle, owned by the scheduler.
pub struct AdmissionReceiver {
    receiver: QueueReceiver,
}

/// Create a queue holding at most `capacity` jobs (0 = unbounded).
pub fn admission_queue(capacity: usize) -> (AdmissionQueue, AdmissionReceiver) {
    let (sender, receiver) = if capacity == 0 {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
    } else {
        let (tx, rx) = mpsc::channel(capacity);
        (QueueSender::Bounded(tx), QueueReceiver::Bounded(rx))
    };

    let queue = AdmissionQueue {
        producer: Arc::new(Mutex::new(Producer {
            sender,
            last_seq: 0,
        })),
        capacity,
    };
    (queue, AdmissionReceiver { receiver })
}

impl AdmissionQueue {
    /// Configured capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `job` if there is room, without waiting.
    pub fn try_enqueue(&self, job: Job) -> Admission {
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let seq = producer.last_seq + 1;
        let queued = QueuedJob { seq, job };

        let sent = match &producer.sender {
            QueueSender::Bounded(tx) => match tx.try_send(queued) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Err(Admission::Refused),
                Err(TrySendError::Closed(_)) => Err(Admission::Closed),
            },
            QueueSender::Unbounded(tx) => tx.send(queued).map_err(|_| Admission::Closed),
        };

        match sent {
            Ok(()) => {
                producer.last_seq = seq;
                debug!(seq, "job admitted");
                Admission::Accepted(seq)
            }
            Err(refusal) => {
                debug!(?refusal, capacity = self.capacity, "job not admitted");
                refusal
            }
        }
    }
}

impl AdmissionReceiver {
    /// Wait for the next job in admission order.
    ///
    /// Returns `None` once all producers are gone and nothing is left.
    pub async fn dequeue(&mut self) -> Option<QueuedJob> {
        match &mut self.receiver {
            QueueReceiver::Bounded(rx) => rx.recv().await,
            QueueReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Take the next job if one is ready, without waiting.
    pub fn try_dequeue(&mut self) -> Option<QueuedJob> {
        match &mut self.receiver {
            QueueReceiver::Bounded(rx) => rx.try_recv().ok(),
            QueueReceiver::Unbounded(rx) => rx.try_recv().ok(),
        }
    }

    /// Number of jobs waiting to be dispatched.
    pub fn len(&self) -> usize {
        match &self.receiver {
            QueueReceiver::Bounded(rx) => rx.len(),
            QueueReceiver::Unbounded(rx) => rx.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
