/*
[INPUT]:  Subject and topic commands, injected Store
[OUTPUT]: Validated curriculum entities
[POS]:    Service layer - subject/topic management
[UPDATE]: When curriculum rules change
*/

use crate::error::{ServiceError, ServiceResult};
use crate::store::{Store, Subject, Topic};
use std::sync::Arc;
use tracing::info;

pub struct CurriculumService {
    store: Arc<dyn Store>,
}

impl CurriculumService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_subjects(&self) -> ServiceResult<Vec<Subject>> {
        Ok(self.store.list_subjects().await?)
    }

    /// Subject names are trimmed and must be unique
    pub async fn create_subject(&self, name: &str) -> ServiceResult<Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("subject name cannot be empty"));
        }

        let subject = Subject::new(name);
        self.store.insert_subject(subject.clone()).await?;
        info!(subject_id = %subject.id, name, "subject created");
        Ok(subject)
    }

    /// Deletes the subject and its topics
    pub async fn delete_subject(&self, id: &str) -> ServiceResult<Subject> {
        let subject = self.store.delete_subject(id).await?;
        info!(subject_id = %subject.id, "subject deleted");
        Ok(subject)
    }

    pub async fn add_topic(
        &self,
        name: &str,
        subject_id: &str,
        sequence_number: u32,
    ) -> ServiceResult<Topic> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("topic name cannot be empty"));
        }

        let topic = Topic::new(subject_id, name, sequence_number);
        self.store.insert_topic(topic.clone()).await?;
        info!(topic_id = %topic.id, subject_id, sequence_number, "topic added");
        Ok(topic)
    }

    pub async fn delete_topic(&self, id: &str) -> ServiceResult<Topic> {
        Ok(self.store.delete_topic(id).await?)
    }

    pub async fn list_topics(&self) -> ServiceResult<Vec<Topic>> {
        Ok(self.store.list_topics().await?)
    }

    pub async fn get_topic(&self, id: &str) -> ServiceResult<Option<Topic>> {
        Ok(self.store.get_topic(id).await?)
    }

    pub async fn get_topic_by_name(&self, name: &str) -> ServiceResult<Option<Topic>> {
        Ok(self.store.find_topic_by_name(name.trim()).await?)
    }
}
