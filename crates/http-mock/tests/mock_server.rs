//! Integration tests for the mock server's HTTP surface.
//!
//! Each test starts its own server in-process on an ephemeral port with its
//! own in-memory state, then drives it with reqwest.

use assert_json_diff::assert_json_include;
use http_mock::server::MockServer;
use http_mock::state::{FileBackend, ScopeKey, State};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::with_state(State::in_memory()).await
    }

    async fn with_state(state: State) -> Self {
        let server = MockServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(state),
            ScopeKey::new("integration"),
        )
        .await
        .expect("Failed to bind mock server");
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn expect(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/_expectation"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    async fn count(&self) -> usize {
        let response = self.get("/_request/count").await;
        assert_eq!(response.status(), StatusCode::OK);
        response.text().await.unwrap().parse().unwrap()
    }
}

#[tokio::test]
async fn test_round_trip() {
    let server = TestServer::start().await;

    let response = server
        .expect(json!({
            "matcher": [{"kind": "path", "value": "/x"}],
            "response": {"status": 200, "headers": {"X-Mock": "yes"}, "body": "ok"}
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server.get("/x").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-mock").unwrap(), "yes");
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = server.get("/y").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        "No matching expectation found"
    );
}

#[tokio::test]
async fn test_newest_expectation_wins() {
    let server = TestServer::start().await;
    for body in ["older", "newer"] {
        server
            .expect(json!({
                "matcher": [{"kind": "path", "value": "/same"}],
                "response": {"body": body}
            }))
            .await;
    }

    assert_eq!(server.get("/same").await.text().await.unwrap(), "newer");
    assert_eq!(server.get("/same").await.text().await.unwrap(), "newer");
}

#[tokio::test]
async fn test_limiter_exhaustion_is_gone() {
    let server = TestServer::start().await;
    server
        .expect(json!({
            "matcher": [{"kind": "method", "value": "post"}, {"kind": "path", "value": "/once"}],
            "response": {"status": 202, "body": "accepted"},
            "limiter": {"kind": "maxRuns", "value": 1}
        }))
        .await;

    let first = server.client.post(server.url("/once")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = server.client.post(server.url("/once")).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::GONE);
    assert_eq!(
        second.text().await.unwrap(),
        "Expectation no longer applicable"
    );

    // Method mismatch never reaches the limiter
    assert_eq!(server.get("/once").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_rejected() {
    let server = TestServer::start().await;

    let response = server
        .expect(json!({
            "matcher": [{"kind": "path", "matches": "(unclosed"}],
            "response": {"body": "never"}
        }))
        .await;
    assert_eq!(response.status(), StatusCode::EXPECTATION_FAILED);
    assert!(response.text().await.unwrap().starts_with("matcher[0].matches"));

    let response = server.expect(json!({"matcher": []})).await;
    assert_eq!(response.status(), StatusCode::EXPECTATION_FAILED);
    assert_eq!(response.text().await.unwrap(), "response: missing");

    // Nothing was stored and control requests are not recorded
    assert_eq!(server.get("/anything").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.count().await, 1);
}

#[tokio::test]
async fn test_recording_is_unconditional() {
    let server = TestServer::start().await;

    let response = server
        .client
        .put(server.url("/missed?page=2&q=a+b"))
        .header("X-Trace", "abc")
        .basic_auth("alice", Some("secret"))
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.get("/_request/0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let recorded: Value = response.json().await.unwrap();
    assert_json_include!(
        actual: recorded,
        expected: json!({
            "method": "PUT",
            "path": "/missed",
            "query": "page=2&q=a+b",
            "queryParams": {"page": "2", "q": "a b"},
            "headers": {"x-trace": "abc"},
            "body": "payload",
            "client": {"user": "alice", "password": "secret"}
        })
    );
}

#[tokio::test]
async fn test_request_queue_fifo_and_lifo() {
    let server = TestServer::start().await;
    for path in ["/r1", "/r2", "/r3", "/r4"] {
        server.get(path).await;
    }
    assert_eq!(server.count().await, 4);

    let path_of = |value: Value| value["path"].as_str().unwrap().to_string();

    let first: Value = server.get("/_request/first").await.json().await.unwrap();
    let last: Value = server.get("/_request/last").await.json().await.unwrap();
    assert_eq!(path_of(first), "/r1");
    assert_eq!(path_of(last), "/r4");
    assert_eq!(server.count().await, 4);

    let shifted: Value = server.delete("/_request/first").await.json().await.unwrap();
    assert_eq!(path_of(shifted), "/r1");
    assert_eq!(server.count().await, 3);

    let popped: Value = server.delete("/_request/last").await.json().await.unwrap();
    assert_eq!(path_of(popped), "/r4");
    assert_eq!(server.count().await, 2);

    let at: Value = server.get("/_request/1").await.json().await.unwrap();
    assert_eq!(path_of(at), "/r3");

    let missing = server.get("/_request/9").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.text().await.unwrap(), "Index 9 not found");
}

#[tokio::test]
async fn test_empty_queue_positions() {
    let server = TestServer::start().await;

    let response = server.get("/_request/first").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "first not available");

    let response = server.delete("/_request/last").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "last not possible");
}

#[tokio::test]
async fn test_oversized_index_is_not_recorded() {
    let server = TestServer::start().await;

    let response = server.get("/_request/99999999999999999999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        "Index 99999999999999999999999 not found"
    );
    assert_eq!(server.count().await, 0);
}

#[tokio::test]
async fn test_clear_semantics() {
    let server = TestServer::start().await;
    server
        .expect(json!({"matcher": [{"kind": "path", "value": "/hit"}], "response": {"body": "hit"}}))
        .await;
    server.get("/hit").await;
    assert_eq!(server.count().await, 1);

    // Clearing expectations keeps the history
    assert_eq!(server.delete("/_expectation").await.status(), StatusCode::OK);
    assert_eq!(server.count().await, 1);
    assert_eq!(server.get("/hit").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.count().await, 2);

    // Clearing requests keeps expectations
    server
        .expect(json!({"matcher": [{"kind": "path", "value": "/hit"}], "response": {"body": "hit"}}))
        .await;
    assert_eq!(server.delete("/_request").await.status(), StatusCode::OK);
    assert_eq!(server.count().await, 0);
    assert_eq!(server.get("/hit").await.status(), StatusCode::OK);

    // Clearing everything empties both
    assert_eq!(server.delete("/_all").await.status(), StatusCode::OK);
    assert_eq!(server.count().await, 0);
    assert_eq!(server.get("/hit").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_identity_marker_and_metrics() {
    let server = TestServer::start().await;

    let response = server.get("/_me").await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.text().await.unwrap(), "O RLY?");

    server.get("/unmatched").await;
    let metrics = server.get("/_metrics").await.text().await.unwrap();
    assert!(metrics.contains("http_mock_requests_total"));
    assert!(metrics.contains("http_mock_control_requests_total"));
}

#[tokio::test]
async fn test_control_path_wrong_method() {
    let server = TestServer::start().await;

    let response = server.client.put(server.url("/_expectation")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get("allow").unwrap(), "POST, DELETE");

    let response = server.client.post(server.url("/_request/count")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(server.count().await, 0);
}

#[tokio::test]
async fn test_custom_matcher_and_binary_body() {
    let server = TestServer::start().await;
    server
        .expect(json!({
            "matcher": [{"kind": "custom", "expression": "request.headers[\"x-role\"] == \"admin\""}],
            "response": {"headers": [{"name": "Content-Type", "value": "application/octet-stream"}],
                         "body": {"base64": "AAECAw=="}}
        }))
        .await;

    let response = server
        .client
        .get(server.url("/bin"))
        .header("X-Role", "admin")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&response.bytes().await.unwrap()[..], &[0u8, 1, 2, 3]);

    let response = server
        .client
        .get(server.url("/bin"))
        .header("X-Role", "guest")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_form_matcher() {
    let server = TestServer::start().await;
    server
        .expect(json!({
            "matcher": [{"kind": "form", "name": "user", "value": "bob smith"}],
            "response": {"body": "welcome"}
        }))
        .await;

    let response = server
        .client
        .post(server.url("/login"))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("user=bob+smith&pass=x")
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "welcome");

    let recorded: Value = server.get("/_request/last").await.json().await.unwrap();
    assert_eq!(recorded["form"]["pass"], "x");
}

#[tokio::test]
async fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = TestServer::with_state(State::new(Arc::new(
        FileBackend::new(dir.path()).unwrap(),
    )))
    .await;
    first
        .expect(json!({"matcher": [{"kind": "path", "value": "/kept"}], "response": {"body": "kept"}}))
        .await;
    first.get("/kept").await;

    // A second instance over the same directory and scope sees the same stores
    let second = TestServer::with_state(State::new(Arc::new(
        FileBackend::new(dir.path()).unwrap(),
    )))
    .await;
    assert_eq!(second.count().await, 1);
    assert_eq!(second.get("/kept").await.text().await.unwrap(), "kept");
}
