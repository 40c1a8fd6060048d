// src/http/handler.rs

//! The single trigger endpoint.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use tracing::{debug, error, warn};

use crate::engine::{Admission, AdmissionQueue};
use crate::http::auth::AuthToken;
use crate::job::JobBuilder;
use crate::types::DenyStatus;

/// Everything a request handler needs, shared across requests.
#[derive(Debug, Clone)]
pub struct HookState {
    pub auth: AuthToken,
    pub deny_status: DenyStatus,
    pub builder: JobBuilder,
    pub queue: AdmissionQueue,
}

/// Handle one trigger request.
///
/// | Condition            | Status        |
/// |----------------------|---------------|
/// | method is not POST   | 405           |
/// | not authorized       | 401 or 403    |
/// | job queued           | 202           |
/// | queue full           | 429           |
///
/// Nothing is built or queued for refused requests. When body forwarding is
/// on, the body is streamed to the job only after it has been admitted, in a
/// task detached from the response.
pub async fn trigger(
    State(state): State<HookState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> StatusCode {
    if !method.as_str().eq_ignore_ascii_case("POST") {
        debug!(%method, %uri, "refusing non-POST request");
        return StatusCode::METHOD_NOT_ALLOWED;
    }

    if !state.auth.authorizes(&headers, uri.query()) {
        warn!(%uri, "refusing unauthorized request");
        return state.deny_status.status_code();
    }

    let (job, sink) = state.builder.build(&uri, &headers);

    match state.queue.try_enqueue(job) {
        Admission::Accepted(seq) => {
            debug!(seq, %uri, "trigger accepted");
            if let Some(sink) = sink {
                tokio::spawn(sink.forward(body));
            }
            StatusCode::ACCEPTED
        }
        Admission::Refused => {
            warn!(
                capacity = state.queue.capacity(),
                "queue full; refusing trigger"
            );
            StatusCode::TOO_MANY_REQUESTS
        }
        Admission::Closed => {
            error!("execution worker is gone; refusing trigger");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
