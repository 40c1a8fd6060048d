// src/http/mod.rs

//! HTTP surface: one catch-all trigger endpoint.
//!
//! - [`auth`] holds the shared-secret check.
//! - [`handler`] turns a request into a queued job (or a refusal status).

pub mod auth;
pub mod handler;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use auth::AuthToken;
pub use handler::{trigger, HookState};

/// Build the router. Every path and method reaches [`trigger`], which
/// decides the status itself.
///
/// `request_timeout` bounds request handling only; the command runs
/// independently of the request once queued.
pub fn router(state: HookState, request_timeout: Duration) -> Router {
    Router::new()
        .fallback(trigger)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C; shutting down"),
        _ = terminate => tracing::info!("received terminate signal; shutting down"),
    }
}
