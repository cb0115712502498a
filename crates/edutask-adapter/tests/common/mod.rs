/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for edutask-adapter tests

use edutask_adapter::{ClientConfig, EdutaskClient, RemoteTask};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Poll interval used by loop tests; short enough to keep the suite fast
#[allow(dead_code)]
pub const TEST_INTERVAL: Duration = Duration::from_millis(40);

/// Opaque task used to exercise the protocol with arbitrary payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoTask {
    pub prompt: String,
}

impl RemoteTask for EchoTask {
    type Output = serde_json::Value;
    const NAME: &'static str = "echo";
    const SUBMIT_PATH: &'static str = "/echo";
    const RESULT_PATH: &'static str = "/echo-result";
}

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> EdutaskClient {
    EdutaskClient::with_config(ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Mount a submit endpoint that acknowledges with `task_id`
#[allow(dead_code)]
pub async fn mount_ack(server: &MockServer, submit_path: &str, task_id: &str) {
    Mock::given(method("POST"))
        .and(path(submit_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": task_id,
            "status": "processing",
            "message": "Task accepted"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount `count` pending answers for a result endpoint; mount the terminal answer afterwards
#[allow(dead_code)]
pub async fn mount_pending(server: &MockServer, result_path: &str, count: u64) {
    Mock::given(method("GET"))
        .and(path(result_path))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "detail": { "status": "processing", "message": "Task is still processing" }
        })))
        .up_to_n_times(count)
        .expect(count)
        .mount(server)
        .await;
}
