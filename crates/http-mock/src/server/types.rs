//! Response helpers shared by the handlers. Header values are static strings.

use crate::error::StoreError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderName, HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn respond(
    status: StatusCode,
    headers: &[(HeaderName, &'static str)],
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    for (name, value) in headers {
        response
            .headers_mut()
            .append(name.clone(), HeaderValue::from_static(*value));
    }
    response
}

/// Status only, empty body
pub fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    respond(status, &[], Bytes::new())
}

pub fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    respond(status, &[(CONTENT_TYPE, content_type)], body)
}

pub fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    with_content_type(status, TEXT_PLAIN, body)
}

/// Pretty-printed JSON; a value that fails to serialize is a 500.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec_pretty(body) {
        Ok(json) => with_content_type(status, "application/json", json),
        Err(e) => server_error(e),
    }
}

/// 500 with the `Server error: ...` body used for every storage failure
pub fn server_error(message: impl std::fmt::Display) -> Response<Full<Bytes>> {
    text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Server error: {message}"),
    )
}

/// Map a store failure: missing items are 404 with the store's message, the rest 500.
pub fn store_error_response(err: &StoreError) -> Response<Full<Bytes>> {
    match err {
        StoreError::NotFound(message) => text_response(StatusCode::NOT_FOUND, message.clone()),
        other => {
            error!("Storage failure: {}", other);
            server_error(other)
        }
    }
}

/// 405 for a control path hit with the wrong method
pub fn method_not_allowed(allowed: &'static str) -> Response<Full<Bytes>> {
    respond(
        StatusCode::METHOD_NOT_ALLOWED,
        &[(ALLOW, allowed), (CONTENT_TYPE, TEXT_PLAIN)],
        "Method not allowed",
    )
}

pub async fn collect_body(body: Incoming) -> Result<Bytes, String> {
    body.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("failed to read request body: {e}"))
}
