//! Mocked requests: record, match, respond.

use crate::expectation::{match_request, MatchOutcome, ResponseSpec};
use crate::metrics;
use crate::recording::normalize_request;
use crate::server::context::ServerContext;
use crate::server::types::{collect_body, server_error, store_error_response, text_response};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::net::SocketAddr;
use tracing::{debug, error};

/// Any non-control request.
///
/// The request is appended to the queue before the engine runs, so misses are
/// recorded too.
pub async fn handle(
    req: Request<Incoming>,
    context: &ServerContext,
    remote: SocketAddr,
) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = match collect_body(body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            metrics::record_outcome("error");
            return server_error(e);
        }
    };

    let recorded = normalize_request(&parts, body.to_vec(), remote);

    if let Err(e) = context.state.transaction(&context.scope, |txn| {
        txn.requests().append(recorded.clone())
    }) {
        metrics::record_outcome("error");
        return store_error_response(&e);
    }

    let outcome = match match_request(&context.state, &context.scope, &recorded) {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::record_outcome("error");
            return store_error_response(&e);
        }
    };

    metrics::record_outcome(outcome.label());
    debug!(
        outcome = outcome.label(),
        "{} {} handled", recorded.method, recorded.path
    );

    match outcome {
        MatchOutcome::Matched { response, .. } => render(response),
        MatchOutcome::NoMatch => {
            text_response(StatusCode::NOT_FOUND, "No matching expectation found")
        }
        MatchOutcome::Exhausted => {
            text_response(StatusCode::GONE, "Expectation no longer applicable")
        }
    }
}

/// Turn a stored response descriptor into a hyper response.
fn render(spec: ResponseSpec) -> Response<Full<Bytes>> {
    let Ok(status) = StatusCode::from_u16(spec.status) else {
        error!("Stored expectation has invalid status {}", spec.status);
        return server_error(format!("invalid status code {}", spec.status));
    };

    let mut builder = Response::builder().status(status);
    for header in &spec.headers {
        builder = builder.header(header.name.as_str(), header.value.as_str());
    }
    builder
        .body(Full::new(Bytes::from(spec.body.into_bytes())))
        .unwrap_or_else(|e| {
            error!("Failed to build mocked response: {}", e);
            server_error(e)
        })
}
