//! Route dispatch for control endpoints and the catch-all path.

use super::context::ServerContext;
use super::handlers::{catch_all, expectations, requests, system};
use super::types::method_not_allowed;
use crate::state::Position;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Control endpoints. Anything that does not parse into one is a mocked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlRoute<'a> {
    /// POST/DELETE /_expectation
    Expectation,
    /// DELETE /_request
    Requests,
    /// GET /_request/count
    RequestCount,
    /// GET /_request/:index, digits kept as sent
    RequestAt(&'a str),
    /// GET/DELETE /_request/first, /_request/last
    RequestEnd(Position),
    /// DELETE /_all
    All,
    /// GET /_me
    Me,
    /// GET /_metrics
    Metrics,
}

impl<'a> ControlRoute<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["_expectation"] => Some(ControlRoute::Expectation),
            ["_request"] => Some(ControlRoute::Requests),
            ["_request", "count"] => Some(ControlRoute::RequestCount),
            ["_request", tail] => match Position::parse(tail) {
                Some(position) => Some(ControlRoute::RequestEnd(position)),
                None if is_index(tail) => Some(ControlRoute::RequestAt(tail)),
                None => None,
            },
            ["_all"] => Some(ControlRoute::All),
            ["_me"] => Some(ControlRoute::Me),
            ["_metrics"] => Some(ControlRoute::Metrics),
            _ => None,
        }
    }

    /// Methods accepted on this path, for the `Allow` header.
    fn allowed(&self) -> &'static str {
        match self {
            ControlRoute::Expectation => "POST, DELETE",
            ControlRoute::Requests | ControlRoute::All => "DELETE",
            ControlRoute::RequestEnd(_) => "GET, DELETE",
            ControlRoute::RequestCount
            | ControlRoute::RequestAt(_)
            | ControlRoute::Me
            | ControlRoute::Metrics => "GET",
        }
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    context: Arc<ServerContext>,
    remote: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let Some(route) = ControlRoute::parse(&path) else {
        debug!("Mocked request: {} {}", method, path);
        return Ok(catch_all::handle(req, &context, remote).await);
    };

    debug!(route = ?route, "Control request: {} {}", method, path);

    let response = match (&method, route) {
        (&Method::POST, ControlRoute::Expectation) => {
            expectations::handle_register(req, &context).await
        }
        (&Method::DELETE, ControlRoute::Expectation) => expectations::handle_clear(&context),

        (&Method::DELETE, ControlRoute::Requests) => requests::handle_clear(&context),
        (&Method::GET, ControlRoute::RequestCount) => requests::handle_count(&context),
        (&Method::GET, ControlRoute::RequestAt(raw)) => requests::handle_get_at(raw, &context),
        (&Method::GET, ControlRoute::RequestEnd(position)) => {
            requests::handle_peek(position, &context)
        }
        (&Method::DELETE, ControlRoute::RequestEnd(position)) => {
            requests::handle_remove(position, &context)
        }

        (&Method::DELETE, ControlRoute::All) => system::handle_clear_all(&context),
        (&Method::GET, ControlRoute::Me) => system::handle_me(),
        (&Method::GET, ControlRoute::Metrics) => system::handle_metrics(),

        (_, route) => method_not_allowed(route.allowed()),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_route_parse() {
        assert_eq!(
            ControlRoute::parse("/_expectation"),
            Some(ControlRoute::Expectation)
        );
        assert_eq!(ControlRoute::parse("/_request"), Some(ControlRoute::Requests));
        assert_eq!(
            ControlRoute::parse("/_request/count"),
            Some(ControlRoute::RequestCount)
        );
        assert_eq!(
            ControlRoute::parse("/_request/12"),
            Some(ControlRoute::RequestAt("12"))
        );
        assert_eq!(
            ControlRoute::parse("/_request/99999999999999999999999"),
            Some(ControlRoute::RequestAt("99999999999999999999999"))
        );
        assert_eq!(
            ControlRoute::parse("/_request/first"),
            Some(ControlRoute::RequestEnd(Position::First))
        );
        assert_eq!(
            ControlRoute::parse("/_request/last"),
            Some(ControlRoute::RequestEnd(Position::Last))
        );
        assert_eq!(ControlRoute::parse("/_all"), Some(ControlRoute::All));
        assert_eq!(ControlRoute::parse("/_me"), Some(ControlRoute::Me));
        assert_eq!(ControlRoute::parse("/_metrics"), Some(ControlRoute::Metrics));
    }

    #[test]
    fn test_non_control_paths_fall_through() {
        assert_eq!(ControlRoute::parse("/"), None);
        assert_eq!(ControlRoute::parse("/api/users"), None);
        assert_eq!(ControlRoute::parse("/_request/middle"), None);
        assert_eq!(ControlRoute::parse("/_request/-1"), None);
        assert_eq!(ControlRoute::parse("/_request/1/extra"), None);
        assert_eq!(ControlRoute::parse("/_expectation/1"), None);
        assert_eq!(ControlRoute::parse("/_request/"), None);
    }

    #[test]
    fn test_allowed_methods() {
        assert_eq!(ControlRoute::Expectation.allowed(), "POST, DELETE");
        assert_eq!(ControlRoute::RequestCount.allowed(), "GET");
        assert_eq!(
            ControlRoute::RequestEnd(Position::First).allowed(),
            "GET, DELETE"
        );
    }
}
