/*
[INPUT]:  Compute service schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;

/// Acknowledgement returned by every submit endpoint and by `/status/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAck {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub message: String,
}

/// One observation of a task's result endpoint, parsed at the HTTP edge
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Completed(T),
    Pending,
    Failed { detail: String },
}

impl<T> PollOutcome<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, PollOutcome::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectsResponse {
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateResponse {
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub scorecard: Option<serde_json::Value>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroGoalResponse {
    pub micro_goals: Vec<serde_json::Value>,
    pub suggestions: Vec<String>,
    pub progress: f64,
}
