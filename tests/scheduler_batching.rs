// tests/scheduler_batching.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use monohook::engine::{
    admission_queue, Admission, AdmissionQueue, ConcurrencyBudget, ConcurrencyMode, Scheduler,
};
use monohook::exec::InvocationOutcome;
use monohook_test_utils::builders::inert_job;
use monohook_test_utils::fake_invoker::{GatedInvoker, RecordingInvoker};
use monohook_test_utils::{init_tracing, with_timeout};

const QUIET_PERIOD: Duration = Duration::from_millis(150);

fn enqueue(queue: &AdmissionQueue, count: usize) {
    for _ in 0..count {
        assert!(matches!(queue.try_enqueue(inert_job()), Admission::Accepted(_)));
    }
}

async fn next_start(started: &mut mpsc::UnboundedReceiver<u64>) -> u64 {
    with_timeout(started.recv())
        .await
        .expect("invoker dropped its start channel")
}

async fn assert_no_start(started: &mut mpsc::UnboundedReceiver<u64>) {
    if let Ok(Some(seq)) = timeout(QUIET_PERIOD, started.recv()).await {
        panic!("job {seq} started while the gate should be closed");
    }
}

#[tokio::test]
async fn batch_waits_for_every_job_before_starting_the_next() {
    init_tracing();

    let (queue, receiver) = admission_queue(0);
    let (invoker, mut started) = GatedInvoker::new();
    let budget = ConcurrencyBudget::new(2, ConcurrencyMode::Batch);
    let worker = tokio::spawn(Scheduler::new(receiver, invoker.clone(), budget).run());

    enqueue(&queue, 3);

    assert_eq!(next_start(&mut started).await, 1);
    assert_eq!(next_start(&mut started).await, 2);

    // Job 1 finishing early does not open the gate while job 2 still runs.
    invoker.release(1);
    assert_no_start(&mut started).await;

    invoker.release(2);
    assert_eq!(next_start(&mut started).await, 3);
    invoker.release(3);

    drop(queue);
    let report = with_timeout(worker).await.unwrap();
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(invoker.max_running(), 2);
}

#[tokio::test]
async fn window_starts_a_job_as_soon_as_a_slot_frees() {
    init_tracing();

    let (queue, receiver) = admission_queue(0);
    let (invoker, mut started) = GatedInvoker::new();
    let budget = ConcurrencyBudget::new(2, ConcurrencyMode::Window);
    let worker = tokio::spawn(Scheduler::new(receiver, invoker.clone(), budget).run());

    enqueue(&queue, 3);

    assert_eq!(next_start(&mut started).await, 1);
    assert_eq!(next_start(&mut started).await, 2);
    assert_no_start(&mut started).await;

    invoker.release(1);
    assert_eq!(next_start(&mut started).await, 3);

    invoker.release(2);
    invoker.release(3);

    drop(queue);
    let report = with_timeout(worker).await.unwrap();
    assert_eq!(report.dispatched, 3);
    assert_eq!(invoker.max_running(), 2);
}

#[tokio::test]
async fn unbounded_budget_starts_everything_immediately() {
    init_tracing();

    let (queue, receiver) = admission_queue(0);
    let (invoker, mut started) = GatedInvoker::new();
    let worker =
        tokio::spawn(Scheduler::new(receiver, invoker.clone(), ConcurrencyBudget::unbounded()).run());

    enqueue(&queue, 5);

    let mut seen = Vec::new();
    for _ in 0..5 {
        seen.push(next_start(&mut started).await);
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(invoker.running(), 5);

    for seq in 1..=5 {
        invoker.release(seq);
    }
    drop(queue);

    let report = with_timeout(worker).await.unwrap();
    assert_eq!(report.succeeded, 5);
}

#[tokio::test]
async fn single_slot_runs_jobs_one_at_a_time_in_order() {
    init_tracing();

    let (queue, receiver) = admission_queue(16);
    let invoker = RecordingInvoker::new().with_delay(Duration::from_millis(5));
    let budget = ConcurrencyBudget::new(1, ConcurrencyMode::default());

    enqueue(&queue, 10);
    drop(queue);

    let report = with_timeout(Scheduler::new(receiver, invoker.clone(), budget).run()).await;

    let expected: Vec<u64> = (1..=10).collect();
    assert_eq!(invoker.started(), expected);
    assert_eq!(invoker.finished(), expected);
    assert_eq!(invoker.max_running(), 1);
    assert_eq!(report.dispatched, 10);
}

#[tokio::test]
async fn running_jobs_never_exceed_the_ceiling() {
    init_tracing();

    for mode in [ConcurrencyMode::Batch, ConcurrencyMode::Window] {
        let (queue, receiver) = admission_queue(0);
        let invoker = RecordingInvoker::new().with_delay(Duration::from_millis(10));

        enqueue(&queue, 12);
        drop(queue);

        let budget = ConcurrencyBudget::new(3, mode);
        let report = with_timeout(Scheduler::new(receiver, invoker.clone(), budget).run()).await;

        assert_eq!(report.dispatched, 12, "mode {mode}");
        assert!(invoker.max_running() <= 3, "mode {mode}: {}", invoker.max_running());
        assert_eq!(invoker.finished().len(), 12, "mode {mode}");
    }
}

#[tokio::test]
async fn failing_jobs_do_not_stop_the_worker() {
    init_tracing();

    let (queue, receiver) = admission_queue(0);
    let invoker = RecordingInvoker::new().with_outcome(InvocationOutcome::Failed(1));

    enqueue(&queue, 4);
    drop(queue);

    let budget = ConcurrencyBudget::new(2, ConcurrencyMode::Batch);
    let report = with_timeout(Scheduler::new(receiver, invoker.clone(), budget).run()).await;

    assert_eq!(report.dispatched, 4);
    assert_eq!(report.failed, 4);
    assert_eq!(report.succeeded, 0);
    assert_eq!(invoker.started(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn closing_the_queue_waits_for_running_jobs() {
    init_tracing();

    let (queue, receiver) = admission_queue(4);
    let (invoker, mut started) = GatedInvoker::new();
    let budget = ConcurrencyBudget::new(4, ConcurrencyMode::Batch);
    let mut worker = tokio::spawn(Scheduler::new(receiver, invoker.clone(), budget).run());

    enqueue(&queue, 2);
    assert_eq!(next_start(&mut started).await, 1);
    assert_eq!(next_start(&mut started).await, 2);

    drop(queue);
    assert!(
        timeout(QUIET_PERIOD, &mut worker).await.is_err(),
        "worker returned while jobs were still running"
    );

    invoker.release(1);
    invoker.release(2);

    let report = with_timeout(worker).await.unwrap();
    assert_eq!(report.dispatched, 2);
    assert_eq!(report.succeeded, 2);
}
