//! Request history inspection.

use crate::error::StoreError;
use crate::metrics;
use crate::recording::RecordedRequest;
use crate::server::context::ServerContext;
use crate::server::types::{empty_response, json_response, store_error_response, text_response};
use crate::state::{Position, Requests};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::{debug, info};

fn with_queue<T>(
    context: &ServerContext,
    f: impl FnOnce(&Requests<'_>) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    context
        .state
        .transaction(&context.scope, |txn| f(&txn.requests()))
}

fn recorded(result: Result<RecordedRequest, StoreError>) -> Response<Full<Bytes>> {
    match result {
        Ok(request) => json_response(StatusCode::OK, &request),
        Err(e) => store_error_response(&e),
    }
}

/// GET /_request/count
pub fn handle_count(context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("request_count");

    match with_queue(context, |queue| queue.count()) {
        Ok(count) => text_response(StatusCode::OK, count.to_string()),
        Err(e) => store_error_response(&e),
    }
}

/// GET /_request/:index
///
/// `raw` is all digits; one too large for `usize` is past the end of any queue.
pub fn handle_get_at(raw: &str, context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("request_at");
    match raw.parse::<usize>() {
        Ok(index) => recorded(with_queue(context, |queue| queue.read_at(index))),
        Err(_) => store_error_response(&StoreError::NotFound(format!("Index {raw} not found"))),
    }
}

/// GET /_request/first, /_request/last
pub fn handle_peek(position: Position, context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("request_peek");
    recorded(with_queue(context, |queue| queue.peek(position)))
}

/// DELETE /_request/first (shift), /_request/last (pop)
pub fn handle_remove(position: Position, context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("request_remove");

    let result = with_queue(context, |queue| queue.remove(position));
    if let Ok(request) = &result {
        debug!(
            position = position.as_str(),
            "Removed {} {} from request queue", request.method, request.path
        );
    }
    recorded(result)
}

/// DELETE /_request - Empty the request queue
pub fn handle_clear(context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("clear_requests");

    match with_queue(context, |queue| queue.clear()) {
        Ok(()) => {
            info!(scope = %context.scope, "Cleared recorded requests");
            empty_response(StatusCode::OK)
        }
        Err(e) => store_error_response(&e),
    }
}
