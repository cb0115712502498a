/*
[INPUT]:  Request payload types of the asynchronous compute endpoints
[OUTPUT]: Submit/result endpoint pairs bound to request and result types
[POS]:    HTTP layer - typed task routing
[UPDATE]: When the compute service adds or renames a task endpoint
*/

use crate::types::{
    ExamPrepRequest, Quiz, QuizEvaluationRequest, QuizRequest, QuizResult, RoutineRequest,
    RoutineResult, StudyGuide,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A request that the compute service runs as a background task.
///
/// The request is POSTed to `SUBMIT_PATH`; the result is read from
/// `RESULT_PATH/{task_id}` and decoded into `Output`.
pub trait RemoteTask: Serialize + Send + Sync {
    type Output: DeserializeOwned + Send;

    /// Short name used in logs
    const NAME: &'static str;
    const SUBMIT_PATH: &'static str;
    const RESULT_PATH: &'static str;

    /// Local check run before the request leaves the process
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl RemoteTask for QuizRequest {
    type Output = Quiz;
    const NAME: &'static str = "quiz_generation";
    const SUBMIT_PATH: &'static str = "/generate-quiz";
    const RESULT_PATH: &'static str = "/quiz-result";

    fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("Please select a subject".to_string());
        }
        Ok(())
    }
}

impl RemoteTask for QuizEvaluationRequest {
    type Output = QuizResult;
    const NAME: &'static str = "quiz_evaluation";
    const SUBMIT_PATH: &'static str = "/submit-quiz";
    const RESULT_PATH: &'static str = "/evaluation-result";
}

impl RemoteTask for RoutineRequest {
    type Output = RoutineResult;
    const NAME: &'static str = "routine_generation";
    const SUBMIT_PATH: &'static str = "/generate-routine";
    const RESULT_PATH: &'static str = "/routine-result";
}

impl RemoteTask for ExamPrepRequest {
    type Output = StudyGuide;
    const NAME: &'static str = "exam_prep";
    const SUBMIT_PATH: &'static str = "/get-prep-assistance";
    const RESULT_PATH: &'static str = "/assistance-result";
}
