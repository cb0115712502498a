/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for edutask-runner tests

#![allow(dead_code)]

use edutask_adapter::{ClientConfig, EdutaskClient, PollPolicy, RemoteTask};
use edutask_runner::{MemoryStore, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_INTERVAL: Duration = Duration::from_millis(40);

/// Opaque task used to drive flows with arbitrary payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoTask {
    pub prompt: String,
}

impl EchoTask {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
        }
    }
}

impl RemoteTask for EchoTask {
    type Output = serde_json::Value;
    const NAME: &'static str = "echo";
    const SUBMIT_PATH: &'static str = "/echo";
    const RESULT_PATH: &'static str = "/echo-result";
}

pub fn fast_policy() -> PollPolicy {
    PollPolicy::fixed(TEST_INTERVAL)
}

pub fn client_for(server: &MockServer) -> EdutaskClient {
    EdutaskClient::with_config(ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    })
    .expect("client init")
}

pub fn memory_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

/// Acknowledge submissions whose prompt matches with `task_id`
pub async fn mount_ack(server: &MockServer, prompt: &str, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_partial_json(serde_json::json!({ "prompt": prompt })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": task_id,
            "status": "processing",
            "message": "Task accepted"
        })))
        .mount(server)
        .await;
}

/// Keep `task_id` pending for every query
pub async fn mount_always_pending(server: &MockServer, task_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/echo-result/{task_id}")))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "status": "processing"
        })))
        .mount(server)
        .await;
}

pub async fn mount_result(server: &MockServer, task_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/echo-result/{task_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
