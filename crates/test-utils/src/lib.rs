//! Shared helpers for monohook's integration tests.
//!
//! - [`builders`]: `HookState` setup and jobs that never spawn anything.
//! - [`fake_invoker`]: `Invoker` implementations that record or hold jobs.

pub mod builders;
pub mod fake_invoker;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route `tracing` output from the scheduler, handler and invoker into the
/// test harness capture. Repeated calls are no-ops.
///
/// `RUST_LOG` overrides the default `info` filter, e.g.
/// `RUST_LOG=monohook=debug,tower_http=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
///
/// Keeps a stuck queue or a scheduler waiting on a batch from hanging the
/// whole test run.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
