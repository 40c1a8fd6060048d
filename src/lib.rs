// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod http;
pub mod job;
pub mod logging;
pub mod types;

use anyhow::{anyhow, Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::HookConfig;
use crate::engine::{admission_queue, ConcurrencyBudget, Scheduler};
use crate::exec::CommandInvoker;
use crate::http::{AuthToken, HookState};
use crate::job::JobBuilder;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the admission queue shared by the HTTP handlers and the scheduler
/// - the execution worker (scheduler + command invoker)
/// - the HTTP server
/// - Ctrl-C / SIGTERM handling
///
/// On shutdown the server stops accepting requests, the queue closes, and the
/// worker finishes every job already admitted before this returns.
pub async fn run(cfg: HookConfig) -> Result<()> {
    let (queue, receiver) = admission_queue(cfg.queue_capacity);

    let budget = ConcurrencyBudget::new(cfg.concurrency, cfg.concurrency_mode);
    let scheduler = Scheduler::new(receiver, CommandInvoker::new(), budget);
    let mut worker = tokio::spawn(scheduler.run());

    let state = HookState {
        auth: AuthToken::new(cfg.auth_token.clone()),
        deny_status: cfg.deny_status,
        builder: JobBuilder::from_config(&cfg),
        queue,
    };
    let app = http::router(state, cfg.request_timeout);

    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    info!(
        addr = %addr,
        command = %cfg.command.display(),
        buffer = cfg.queue_capacity,
        concurrency = cfg.concurrency,
        mode = %cfg.concurrency_mode,
        authorization = cfg.auth_token.is_some(),
        "listening for webhook triggers"
    );

    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(http::shutdown_signal())
            .await
    };

    tokio::select! {
        served = server => served.context("HTTP server failed")?,
        stopped = &mut worker => {
            return Err(match stopped {
                Ok(_) => anyhow!("execution worker stopped unexpectedly"),
                Err(err) => anyhow!("execution worker crashed: {err}"),
            });
        }
    }

    // The router (and with it every queue producer) is gone; let the worker
    // finish what was already admitted.
    let report = worker.await.context("execution worker crashed")?;
    info!(
        dispatched = report.dispatched,
        succeeded = report.succeeded,
        failed = report.failed,
        "monohook stopped"
    );
    Ok(())
}
