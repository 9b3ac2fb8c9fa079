//! Normalization of inbound hyper requests into [`RecordedRequest`] snapshots.

use super::types::{ClientMeta, Payload, RecordedRequest};
use base64::Engine;
use hyper::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, HOST, USER_AGENT};
use hyper::http::request::Parts;
use hyper::HeaderMap;
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// Build a recorded request from the request head, the collected body and the peer address.
pub fn normalize_request(
    parts: &Parts,
    body: impl Into<Vec<u8>>,
    remote: SocketAddr,
) -> RecordedRequest {
    let body = Payload::new(body);
    let query = parts.uri.query().unwrap_or("").to_string();
    let headers = collect_headers(&parts.headers);

    let form = if is_form_encoded(&parts.headers) {
        parse_query_string(&body.to_text())
    } else {
        BTreeMap::new()
    };

    RecordedRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        query_params: parse_query_string(&query),
        query,
        headers,
        body,
        form,
        client: client_meta(&parts.headers, remote),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Parse a query string (or url-encoded form body), decoding keys and values.
///
/// A key without `=` maps to an empty value; for repeated keys the last one wins.
pub fn parse_query_string(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn client_meta(headers: &HeaderMap, remote: SocketAddr) -> ClientMeta {
    let (host, port) = match header_str(headers, HOST) {
        Some(raw) => split_host_port(raw),
        None => (None, None),
    };
    let (user, password) = header_str(headers, AUTHORIZATION)
        .and_then(parse_basic_auth)
        .map_or((None, None), |(u, p)| (Some(u), p));

    ClientMeta {
        remote_addr: remote.to_string(),
        host,
        port,
        user,
        password,
        user_agent: header_str(headers, USER_AGENT).map(str::to_string),
    }
}

fn split_host_port(raw: &str) -> (Option<String>, Option<u16>) {
    // Bracketed IPv6 literal: [::1]:8080
    if let Some(rest) = raw.strip_prefix('[') {
        if let Some((addr, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (Some(addr.to_string()), port);
        }
    }
    match raw.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (Some(host.to_string()), Some(port)),
            Err(_) => (Some(raw.to_string()), None),
        },
        _ => (Some(raw.to_string()), None),
    }
}

/// Decode `Authorization: Basic ...` into user and optional password.
fn parse_basic_auth(header: &str) -> Option<(String, Option<String>)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    match decoded.split_once(':') {
        Some((user, password)) => Some((user.to_string(), Some(password.to_string()))),
        None => Some((decoded, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;

    fn parts_of(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    fn remote() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn test_parse_query_string() {
        let parsed = parse_query_string("name=alice&age=30&flag&q=a%20b+c");
        assert_eq!(parsed.get("name"), Some(&"alice".to_string()));
        assert_eq!(parsed.get("age"), Some(&"30".to_string()));
        assert_eq!(parsed.get("flag"), Some(&String::new()));
        assert_eq!(parsed.get("q"), Some(&"a b c".to_string()));
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_normalize_basic_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/items?page=2")
            .header("Host", "localhost:8082")
            .header("User-Agent", "test-agent")
            .header("X-Tag", "a")
            .header("X-Tag", "b")
            .body(())
            .unwrap();

        let recorded = normalize_request(&parts_of(req), b"payload".to_vec(), remote());
        assert_eq!(recorded.method, "POST");
        assert_eq!(recorded.path, "/api/items");
        assert_eq!(recorded.query, "page=2");
        assert_eq!(recorded.query_params.get("page"), Some(&"2".to_string()));
        assert_eq!(recorded.header("x-tag"), Some("a, b"));
        assert_eq!(recorded.body.as_bytes(), b"payload");
        assert_eq!(recorded.client.host.as_deref(), Some("localhost"));
        assert_eq!(recorded.client.port, Some(8082));
        assert_eq!(recorded.client.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(recorded.client.remote_addr, "127.0.0.1:40000");
        assert!(recorded.form.is_empty());
    }

    #[test]
    fn test_normalize_form_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/login")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap();

        let recorded =
            normalize_request(&parts_of(req), b"user=bob&note=hi+there".to_vec(), remote());
        assert_eq!(recorded.form.get("user"), Some(&"bob".to_string()));
        assert_eq!(recorded.form.get("note"), Some(&"hi there".to_string()));
    }

    #[test]
    fn test_basic_auth_is_decoded() {
        // "alice:secret"
        let req = Request::builder()
            .uri("/")
            .header("Authorization", "Basic YWxpY2U6c2VjcmV0")
            .body(())
            .unwrap();

        let recorded = normalize_request(&parts_of(req), Vec::new(), remote());
        assert_eq!(recorded.client.user.as_deref(), Some("alice"));
        assert_eq!(recorded.client.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("example.com"),
            (Some("example.com".to_string()), None)
        );
        assert_eq!(
            split_host_port("example.com:81"),
            (Some("example.com".to_string()), Some(81))
        );
        assert_eq!(
            split_host_port("[::1]:9000"),
            (Some("::1".to_string()), Some(9000))
        );
    }
}
