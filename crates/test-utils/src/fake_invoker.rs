use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

use monohook::exec::{InvocationOutcome, Invoker};
use monohook::job::QueuedJob;

/// Tracks how many fake invocations overlap.
#[derive(Debug, Default)]
struct Concurrency {
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl Concurrency {
    fn enter(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A fake invoker that:
/// - records the sequence numbers of the jobs it was given, in start order
/// - optionally sleeps to simulate work
/// - reports the configured outcome without spawning anything.
#[derive(Clone)]
pub struct RecordingInvoker {
    started: Arc<Mutex<Vec<u64>>>,
    finished: Arc<Mutex<Vec<u64>>>,
    concurrency: Arc<Concurrency>,
    delay: Option<Duration>,
    outcome: InvocationOutcome,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(Vec::new())),
            concurrency: Arc::new(Concurrency::default()),
            delay: None,
            outcome: InvocationOutcome::Success,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_outcome(mut self, outcome: InvocationOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn started(&self) -> Vec<u64> {
        self.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<u64> {
        self.finished.lock().unwrap().clone()
    }

    pub fn max_running(&self) -> usize {
        self.concurrency.max_running.load(Ordering::SeqCst)
    }
}

impl Default for RecordingInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker for RecordingInvoker {
    fn invoke(
        &self,
        job: QueuedJob,
    ) -> Pin<Box<dyn Future<Output = InvocationOutcome> + Send + '_>> {
        Box::pin(async move {
            self.concurrency.enter();
            self.started.lock().unwrap().push(job.seq);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.finished.lock().unwrap().push(job.seq);
            self.concurrency.exit();
            self.outcome
        })
    }
}

/// A fake invoker whose invocations only complete when the test says so.
///
/// Every start is announced on the channel returned by [`GatedInvoker::new`];
/// [`GatedInvoker::release`] lets the invocation with that sequence number
/// finish (releasing before the start is fine).
#[derive(Clone)]
pub struct GatedInvoker {
    started_tx: mpsc::UnboundedSender<u64>,
    gates: Arc<Mutex<HashMap<u64, Arc<Notify>>>>,
    concurrency: Arc<Concurrency>,
}

impl GatedInvoker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let invoker = Self {
            started_tx,
            gates: Arc::new(Mutex::new(HashMap::new())),
            concurrency: Arc::new(Concurrency::default()),
        };
        (invoker, started_rx)
    }

    pub fn release(&self, seq: u64) {
        self.gate(seq).notify_one();
    }

    pub fn running(&self) -> usize {
        self.concurrency.running.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.concurrency.max_running.load(Ordering::SeqCst)
    }

    fn gate(&self, seq: u64) -> Arc<Notify> {
        let mut gates = self.gates.lock().unwrap();
        Arc::clone(gates.entry(seq).or_insert_with(|| Arc::new(Notify::new())))
    }
}

impl Invoker for GatedInvoker {
    fn invoke(
        &self,
        job: QueuedJob,
    ) -> Pin<Box<dyn Future<Output = InvocationOutcome> + Send + '_>> {
        Box::pin(async move {
            self.concurrency.enter();
            let gate = self.gate(job.seq);
            let _ = self.started_tx.send(job.seq);

            gate.notified().await;

            self.concurrency.exit();
            InvocationOutcome::Success
        })
    }
}
