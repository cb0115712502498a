/*
[INPUT]:  Task id, RemoteTask result endpoint, PollPolicy, CancellationToken
[OUTPUT]: Decoded task result or terminal polling error
[POS]:    HTTP layer - task poll loop (one outstanding query per task)
[UPDATE]: When result status mapping or loop termination rules change
*/

use crate::http::client::extract_detail;
use crate::http::{EdutaskClient, EdutaskError, PollPolicy, RemoteTask, Result};
use crate::types::PollOutcome;
use reqwest::{Method, StatusCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

impl EdutaskClient {
    /// Query a task result once.
    ///
    /// GET {T::RESULT_PATH}/{task_id}
    /// 200 decodes the payload, 202 is pending, 500 carries `detail`.
    pub async fn poll_once<T: RemoteTask>(&self, task_id: &str) -> Result<PollOutcome<T::Output>> {
        let builder = self.task_request(Method::GET, T::RESULT_PATH, task_id)?;
        let transport = |source| EdutaskError::PollingTransport {
            task_id: task_id.to_string(),
            source,
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();

        match status {
            StatusCode::OK => {
                let bytes = response.bytes().await.map_err(transport)?;
                let payload = serde_json::from_slice(&bytes)?;
                Ok(PollOutcome::Completed(payload))
            }
            StatusCode::ACCEPTED => Ok(PollOutcome::Pending),
            StatusCode::INTERNAL_SERVER_ERROR => {
                let body = response.text().await.map_err(transport)?;
                Ok(PollOutcome::Failed {
                    detail: extract_detail(&body),
                })
            }
            other => {
                let body = response.text().await.unwrap_or_default();
                Err(EdutaskError::UnexpectedStatus {
                    task_id: task_id.to_string(),
                    code: other.as_u16(),
                    body,
                })
            }
        }
    }

    /// Poll a task until it reaches a terminal state.
    ///
    /// Exactly one query is in flight at a time. The token is observed while a
    /// query is outstanding and during every wait; once it fires the loop
    /// returns `Cancelled` without issuing another query. A policy deadline
    /// also cuts an outstanding query short.
    pub async fn wait_for<T: RemoteTask>(
        &self,
        task_id: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<T::Output> {
        let started = Instant::now();
        let deadline_at = policy.deadline.map(|deadline| started + deadline);
        let mut attempts: u32 = 0;

        loop {
            let cancelled = || EdutaskError::Cancelled {
                task_id: task_id.to_string(),
            };

            if cancel.is_cancelled() {
                debug!(task = T::NAME, task_id, attempts, "poll loop cancelled before query");
                return Err(cancelled());
            }

            attempts += 1;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(task = T::NAME, task_id, attempts, "poll loop cancelled during query");
                    return Err(cancelled());
                }
                _ = sleep_until_deadline(deadline_at) => {
                    let elapsed = started.elapsed();
                    warn!(task = T::NAME, task_id, attempts, ?elapsed, "poll deadline passed during query");
                    return Err(EdutaskError::DeadlineExceeded {
                        task_id: task_id.to_string(),
                        elapsed,
                    });
                }
                outcome = self.poll_once::<T>(task_id) => outcome?,
            };

            match outcome {
                PollOutcome::Completed(payload) => {
                    info!(task = T::NAME, task_id, attempts, "task completed");
                    return Ok(payload);
                }
                PollOutcome::Failed { detail } => {
                    warn!(task = T::NAME, task_id, attempts, detail = %detail, "task failed");
                    return Err(EdutaskError::TaskFailed {
                        task_id: task_id.to_string(),
                        detail,
                    });
                }
                PollOutcome::Pending => {}
            }

            if policy.attempts_exhausted(attempts) {
                warn!(task = T::NAME, task_id, attempts, "poll attempts exhausted");
                return Err(EdutaskError::AttemptsExhausted {
                    task_id: task_id.to_string(),
                    attempts,
                });
            }

            let delay = policy.delay_for(attempts);
            let elapsed = started.elapsed();
            if policy.deadline_passed(elapsed, delay) {
                warn!(task = T::NAME, task_id, attempts, ?elapsed, "poll deadline exceeded");
                return Err(EdutaskError::DeadlineExceeded {
                    task_id: task_id.to_string(),
                    elapsed,
                });
            }

            debug!(task = T::NAME, task_id, attempts, ?delay, "task pending");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(task = T::NAME, task_id, attempts, "poll loop cancelled while waiting");
                    return Err(cancelled());
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Submit a task, then poll it to completion with the same token
    pub async fn run_task<T: RemoteTask>(
        &self,
        request: &T,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<T::Output> {
        let ack = self.submit(request).await?;
        self.wait_for::<T>(&ack.task_id, policy, cancel).await
    }
}

async fn sleep_until_deadline(deadline_at: Option<Instant>) {
    match deadline_at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, EdutaskClient, EdutaskError};
    use crate::types::{PollOutcome, RoutineRequest};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EdutaskClient {
        EdutaskClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init")
    }

    #[tokio::test]
    async fn test_poll_once_pending_ignores_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/routine-result/r-1"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "detail": { "status": "processing", "message": "Task is still processing" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .poll_once::<RoutineRequest>("r-1")
            .await
            .expect("poll_once failed");

        assert!(outcome.is_pending());
    }

    #[tokio::test]
    async fn test_poll_once_failure_carries_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/routine-result/r-2"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "detail": "Task failed: model offline" })),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .poll_once::<RoutineRequest>("r-2")
            .await
            .expect("poll_once failed");

        match outcome {
            PollOutcome::Failed { detail } => assert_eq!(detail, "Task failed: model offline"),
            other => panic!("Expected Failed outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_once_unknown_task_is_unexpected_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/routine-result/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "detail": "Task not found" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .poll_once::<RoutineRequest>("missing")
            .await
            .expect_err("404 must fail");

        match err {
            EdutaskError::UnexpectedStatus { task_id, code, .. } => {
                assert_eq!(task_id, "missing");
                assert_eq!(code, 404);
            }
            other => panic!("Expected UnexpectedStatus, got {other:?}"),
        }
    }
}
