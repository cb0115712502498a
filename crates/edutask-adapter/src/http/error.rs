/*
[INPUT]:  Error sources (HTTP, task service, serialization, polling policy)
[OUTPUT]: Structured error types with context and transport hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the edutask adapter
#[derive(Error, Debug)]
pub enum EdutaskError {
    /// The request was rejected locally and never sent
    #[error("{0}")]
    InvalidRequest(String),

    /// Submitting a task failed (transport error or non-2xx response)
    #[error("Task submission to {endpoint} failed: {reason}")]
    Submission {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    /// Transport failure while querying a task result
    #[error("Polling task {task_id} failed: {source}")]
    PollingTransport {
        task_id: String,
        #[source]
        source: reqwest::Error,
    },

    /// The compute service reported the task as failed
    #[error("Task {task_id} failed: {detail}")]
    TaskFailed { task_id: String, detail: String },

    /// The caller stopped observing the task
    #[error("Polling task {task_id} was cancelled")]
    Cancelled { task_id: String },

    /// The task was still pending when the attempt budget ran out
    #[error("Task {task_id} still pending after {attempts} attempts")]
    AttemptsExhausted { task_id: String, attempts: u32 },

    /// The task was still pending when the polling deadline passed
    #[error("Task {task_id} still pending after {elapsed:?}")]
    DeadlineExceeded { task_id: String, elapsed: Duration },

    /// The result endpoint answered outside of 200/202/500
    #[error("Unexpected status {code} for task {task_id}: {body}")]
    UnexpectedStatus {
        task_id: String,
        code: u16,
        body: String,
    },

    /// A synchronous endpoint returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EdutaskError {
    /// Check if the error came from the network rather than the service's answer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EdutaskError::Http(_)
                | EdutaskError::PollingTransport { .. }
                | EdutaskError::Submission { status: None, .. }
        )
    }

    /// Check if the error ends a poll loop without a service verdict
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            EdutaskError::Cancelled { .. }
                | EdutaskError::AttemptsExhausted { .. }
                | EdutaskError::DeadlineExceeded { .. }
        )
    }

    /// Message shown to the person waiting on the task.
    ///
    /// Task failures surface the service's `detail` verbatim.
    pub fn user_message(&self) -> String {
        match self {
            EdutaskError::TaskFailed { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        EdutaskError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    pub(crate) fn submission(
        endpoint: &str,
        status: Option<StatusCode>,
        reason: impl Into<String>,
    ) -> Self {
        EdutaskError::Submission {
            endpoint: endpoint.to_string(),
            status: status.map(|code| code.as_u16()),
            reason: reason.into(),
        }
    }
}

/// Result type alias for edutask operations
pub type Result<T> = std::result::Result<T, EdutaskError>;
