/*
[INPUT]:  Engagement samples per student, learning objectives
[OUTPUT]: Stored engagement records and micro-goal plans
[POS]:    Service layer - engagement tracking and POST /micro-goals
[UPDATE]: When engagement fields or the micro-goal endpoint change
*/

use crate::error::{ServiceError, ServiceResult};
use crate::store::{EngagementRecord, Store};
use edutask_adapter::{EdutaskClient, EngagementSample, MicroGoalRequest, MicroGoalResponse};
use std::sync::Arc;
use tracing::{debug, info};

pub struct EngagementService {
    client: EdutaskClient,
    store: Arc<dyn Store>,
}

impl EngagementService {
    pub fn new(client: EdutaskClient, store: Arc<dyn Store>) -> Self {
        Self { client, store }
    }

    pub async fn save(&self, student_id: &str, sample: EngagementSample) -> ServiceResult<EngagementRecord> {
        if sample.topic.trim().is_empty() {
            return Err(ServiceError::validation("engagement topic cannot be empty"));
        }
        if sample.time_spent < 0.0 {
            return Err(ServiceError::validation("time spent cannot be negative"));
        }
        if !(0.0..=100.0).contains(&sample.engagement_score) {
            return Err(ServiceError::validation("engagement score must be within 0-100"));
        }

        let record = EngagementRecord::new(student_id, sample);
        self.store.insert_engagement(record.clone()).await?;
        debug!(student_id, topic = %record.sample.topic, "engagement saved");
        Ok(record)
    }

    /// Samples recorded for the student, oldest first
    pub async fn fetch(&self, student_id: &str) -> ServiceResult<Vec<EngagementSample>> {
        let records = self.store.list_engagement(student_id).await?;
        Ok(records.into_iter().map(|r| r.sample).collect())
    }

    /// Ask the optimizer for micro goals, informed by the student's history
    pub async fn micro_goals(
        &self,
        student_id: &str,
        learning_objective: &str,
        interests: Vec<String>,
    ) -> ServiceResult<MicroGoalResponse> {
        let learning_objective = learning_objective.trim();
        if learning_objective.is_empty() {
            return Err(ServiceError::validation("learning objective cannot be empty"));
        }

        let engagement = self.fetch(student_id).await?;
        let samples = engagement.len();
        let request = MicroGoalRequest {
            learning_objective: learning_objective.to_string(),
            interests: (!interests.is_empty()).then_some(interests),
            engagement_data: (!engagement.is_empty()).then_some(engagement),
        };

        let response = self.client.micro_goals(&request).await?;
        info!(
            student_id,
            samples,
            goals = response.micro_goals.len(),
            progress = response.progress,
            "micro goals received"
        );
        Ok(response)
    }
}
