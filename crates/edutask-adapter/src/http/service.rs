/*
[INPUT]:  Task ids, debate turns, micro-goal requests
[OUTPUT]: Synchronous compute service answers (catalog, ability, history, AI replies)
[POS]:    HTTP layer - request/response endpoints (no task id involved)
[UPDATE]: When adding new synchronous endpoints or changing response format
*/

use crate::http::{EdutaskClient, Result};
use crate::types::{
    CleanupResponse, DebateRequest, DebateResponse, MicroGoalRequest, MicroGoalResponse,
    StudentAbility, StudentHistory, SubjectsResponse, TaskAck,
};
use reqwest::Method;

impl EdutaskClient {
    /// List subjects the quiz generator knows about
    ///
    /// GET /subjects
    pub async fn list_subjects(&self) -> Result<Vec<String>> {
        let builder = self.request(Method::GET, "/subjects")?;
        let response: SubjectsResponse = self.send_json(builder).await?;
        Ok(response.subjects)
    }

    /// Current IRT ability estimate of the student
    ///
    /// GET /student-ability
    pub async fn student_ability(&self) -> Result<StudentAbility> {
        let builder = self.request(Method::GET, "/student-ability")?;
        self.send_json(builder).await
    }

    /// Quiz history keyed by quiz id
    ///
    /// GET /student-history
    pub async fn student_history(&self) -> Result<StudentHistory> {
        let builder = self.request(Method::GET, "/student-history")?;
        self.send_json(builder).await
    }

    /// Status probe for any background task
    ///
    /// GET /status/{task_id}
    pub async fn task_status(&self, task_id: &str) -> Result<TaskAck> {
        let builder = self.task_request(Method::GET, "/status", task_id)?;
        self.send_json(builder).await
    }

    /// Drop a finished task from the service's task table
    ///
    /// DELETE /cleanup-task/{task_id}
    pub async fn cleanup_task(&self, task_id: &str) -> Result<CleanupResponse> {
        let builder = self.task_request(Method::DELETE, "/cleanup-task", task_id)?;
        self.send_json(builder).await
    }

    /// Play one debate turn, or close the debate with `DebateAction::End`
    ///
    /// POST /debate
    pub async fn debate_turn(&self, request: &DebateRequest) -> Result<DebateResponse> {
        let builder = self.request(Method::POST, "/debate")?.json(request);
        self.send_json(builder).await
    }

    /// Break a learning objective into micro goals
    ///
    /// POST /micro-goals
    pub async fn micro_goals(&self, request: &MicroGoalRequest) -> Result<MicroGoalResponse> {
        let builder = self.request(Method::POST, "/micro-goals")?.json(request);
        self.send_json(builder).await
    }
}
