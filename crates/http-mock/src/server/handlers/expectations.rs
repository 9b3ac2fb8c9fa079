//! Expectation registration and clearing.

use crate::error::RegistrationError;
use crate::expectation::register;
use crate::metrics;
use crate::server::context::ServerContext;
use crate::server::types::{collect_body, empty_response, store_error_response, text_response};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{info, warn};

/// POST /_expectation - Register an expectation
pub async fn handle_register(
    req: Request<Incoming>,
    context: &ServerContext,
) -> Response<Full<Bytes>> {
    metrics::record_control("register_expectation");

    let body = match collect_body(req.into_body()).await {
        Ok(b) => b,
        Err(e) => return text_response(StatusCode::BAD_REQUEST, e),
    };

    match register(&context.state, &context.scope, &body) {
        Ok(()) => {
            metrics::record_registration();
            info!(scope = %context.scope, "Registered expectation");
            empty_response(StatusCode::CREATED)
        }
        Err(RegistrationError::Invalid(e)) => {
            warn!(scope = %context.scope, "Rejected expectation: {}", e);
            text_response(StatusCode::EXPECTATION_FAILED, e.to_string())
        }
        Err(RegistrationError::Store(e)) => store_error_response(&e),
    }
}

/// DELETE /_expectation - Remove every expectation in this scope
pub fn handle_clear(context: &ServerContext) -> Response<Full<Bytes>> {
    metrics::record_control("clear_expectations");

    match context
        .state
        .transaction(&context.scope, |txn| txn.expectations().clear())
    {
        Ok(()) => {
            info!(scope = %context.scope, "Cleared expectations");
            empty_response(StatusCode::OK)
        }
        Err(e) => store_error_response(&e),
    }
}
