//! Decoding and validation of `POST /_expectation` bodies.

use super::types::{deserialize_headers, Expectation, ResponseSpec};
use crate::error::{RegistrationError, ValidationError};
use crate::predicate::{Limiter, LimiterSpec, Matcher, MatcherSpec};
use crate::recording::Payload;
use crate::state::{ScopeKey, State};
use hyper::header::{HeaderName, HeaderValue};
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode a registration body into a validated, unregistered [`Expectation`].
///
/// Errors name the offending field, e.g. `matcher[1].matches: ...`.
pub fn parse_registration(body: &[u8]) -> Result<Expectation, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::new("", format!("invalid JSON: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(ValidationError::new("", "expected a JSON object"));
    };

    let matchers = match fields.remove("matcher") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                decode::<MatcherSpec>(item)
                    .and_then(Matcher::compile)
                    .map_err(|e| e.within(&format!("matcher[{i}]")))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ValidationError::new("matcher", "expected an array")),
    };

    let response = match fields.remove("response") {
        None | Some(Value::Null) => return Err(ValidationError::new("response", "missing")),
        Some(raw) => decode_response(raw)
            .and_then(validate_response)
            .map_err(|e| e.within("response"))?,
    };

    let limiter = match fields.remove("limiter") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            decode::<LimiterSpec>(raw)
                .and_then(Limiter::compile)
                .map_err(|e| e.within("limiter"))?,
        ),
    };

    Ok(Expectation::new(matchers, response, limiter))
}

/// Validate `body` and prepend the expectation to `scope`'s store.
pub fn register(state: &State, scope: &ScopeKey, body: &[u8]) -> Result<(), RegistrationError> {
    let expectation = parse_registration(body)?;
    state.transaction(scope, |txn| txn.expectations().prepend(expectation))?;
    Ok(())
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::new("", e.to_string()))
}

/// Field by field, so a type error names `status`, `headers` or `body`.
/// Null fields take their defaults.
fn decode_response(raw: Value) -> Result<ResponseSpec, ValidationError> {
    let Value::Object(mut fields) = raw else {
        return Err(ValidationError::new("", "expected an object"));
    };
    let mut spec = ResponseSpec::default();

    if let Some(raw) = present(&mut fields, "status") {
        spec.status = decode::<u16>(raw).map_err(|e| e.within("status"))?;
    }

    if let Some(raw) = present(&mut fields, "headers") {
        spec.headers = deserialize_headers(raw).map_err(|_| {
            ValidationError::new(
                "headers",
                "expected an object of strings or a list of {\"name\", \"value\"} pairs",
            )
        })?;
    }

    if let Some(raw) = present(&mut fields, "body") {
        spec.body = match raw {
            Value::String(text) => Payload::from(text),
            Value::Object(binary) if binary.contains_key("base64") => {
                serde_json::from_value(Value::Object(binary))
                    .map_err(|e| ValidationError::new("body", e.to_string()))?
            }
            _ => {
                return Err(ValidationError::new(
                    "body",
                    "expected a string or {\"base64\": \"...\"}",
                ))
            }
        };
    }

    Ok(spec)
}

fn present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| !value.is_null())
}

fn validate_response(spec: ResponseSpec) -> Result<ResponseSpec, ValidationError> {
    StatusCode::from_u16(spec.status).map_err(|_| {
        ValidationError::new(
            "status",
            format!("invalid status code {} (expected 100..=999)", spec.status),
        )
    })?;

    for (i, header) in spec.headers.iter().enumerate() {
        let field = format!("headers[{i}]");
        HeaderName::from_bytes(header.name.as_bytes()).map_err(|_| {
            ValidationError::new(&field, format!("invalid header name \"{}\"", header.name))
        })?;
        HeaderValue::from_str(&header.value).map_err(|_| {
            ValidationError::new(&field, format!("invalid value for header \"{}\"", header.name))
        })?;
    }

    Ok(spec)
}
