//! System handlers: identity marker, metrics, clear all.

use crate::metrics;
use crate::server::context::ServerContext;
use crate::server::types::{empty_response, store_error_response, text_response, with_content_type};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;

/// GET /_me - Liveness marker
pub fn handle_me() -> Response<Full<Bytes>> {
    metrics::record_control("me");
    text_response(StatusCode::IM_A_TEAPOT, "O RLY?")
}

/// GET /_metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    metrics::record_control("metrics");
    with_content_type(
        StatusCode::OK,
        "text/plain; version=0.0.4",
        metrics::collect_metrics(),
    )
}

/// DELETE /_all - Clear expectations and recorded requests
pub fn handle_clear_all(context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("clear_all");

    let result = context.state.transaction(&context.scope, |txn| {
        txn.expectations().clear()?;
        txn.requests().clear()
    });
    match result {
        Ok(()) => {
            info!(scope = %context.scope, "Cleared expectations and recorded requests");
            empty_response(StatusCode::OK)
        }
        Err(e) => store_error_response(&e),
    }
}
