/*
[INPUT]:  Curriculum, quiz, debate and engagement entities
[OUTPUT]: Store trait plus shared in-process table logic
[POS]:    Persistence layer - injected collaborator for the services
[UPDATE]: When adding entities or store operations
*/

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edutask_adapter::{EngagementSample, QuestionType, Stance};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject_id: String,
    pub name: String,
    /// Position of the topic within its subject
    pub sequence_number: u32,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(subject_id: impl Into<String>, name: impl Into<String>, sequence_number: u32) -> Self {
        Self {
            id: new_id(),
            subject_id: subject_id.into(),
            name: name.into(),
            sequence_number,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub points: Decimal,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub class_id: Option<String>,
    pub created_by: String,
    pub is_ai_generated: bool,
    pub questions: Vec<StoredQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Quiz listing row with the number of submissions received
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    pub quiz: Quiz,
    pub submission_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    /// Percentage of available points earned
    pub score: Decimal,
    pub answers: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debate {
    pub id: String,
    pub student_id: String,
    pub topic: String,
    pub stance: Stance,
    pub cards: Vec<String>,
    pub ai_response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub id: String,
    pub student_id: String,
    #[serde(flatten)]
    pub sample: EngagementSample,
    pub recorded_at: DateTime<Utc>,
}

impl EngagementRecord {
    pub fn new(student_id: impl Into<String>, sample: EngagementSample) -> Self {
        Self {
            id: new_id(),
            student_id: student_id.into(),
            sample,
            recorded_at: Utc::now(),
        }
    }
}

/// Persistence collaborator for the runner services.
///
/// Handed to each service as `Arc<dyn Store>`; there is no global instance.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>>;
    async fn get_subject(&self, id: &str) -> StoreResult<Option<Subject>>;
    /// Fails with `Conflict` when a subject with the same name exists
    async fn insert_subject(&self, subject: Subject) -> StoreResult<()>;
    /// Removes the subject and every topic under it
    async fn delete_subject(&self, id: &str) -> StoreResult<Subject>;

    async fn list_topics(&self) -> StoreResult<Vec<Topic>>;
    async fn get_topic(&self, id: &str) -> StoreResult<Option<Topic>>;
    async fn find_topic_by_name(&self, name: &str) -> StoreResult<Option<Topic>>;
    async fn insert_topic(&self, topic: Topic) -> StoreResult<()>;
    async fn delete_topic(&self, id: &str) -> StoreResult<Topic>;

    /// Newest first
    async fn list_quizzes(&self) -> StoreResult<Vec<QuizSummary>>;
    async fn get_quiz(&self, id: &str) -> StoreResult<Option<Quiz>>;
    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<()>;
    /// Removes the quiz together with its submissions
    async fn delete_quiz(&self, id: &str) -> StoreResult<Quiz>;
    async fn insert_submission(&self, submission: QuizSubmission) -> StoreResult<()>;

    async fn get_debate(&self, id: &str) -> StoreResult<Option<Debate>>;
    async fn insert_debate(&self, debate: Debate) -> StoreResult<()>;
    async fn update_debate(&self, debate: Debate) -> StoreResult<()>;

    async fn insert_engagement(&self, record: EngagementRecord) -> StoreResult<()>;
    async fn list_engagement(&self, student_id: &str) -> StoreResult<Vec<EngagementRecord>>;
}

/// Tables shared by the memory and JSON file backends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    subjects: BTreeMap<String, Subject>,
    #[serde(default)]
    topics: BTreeMap<String, Topic>,
    #[serde(default)]
    quizzes: BTreeMap<String, Quiz>,
    #[serde(default)]
    submissions: Vec<QuizSubmission>,
    #[serde(default)]
    debates: BTreeMap<String, Debate>,
    #[serde(default)]
    engagement: Vec<EngagementRecord>,
}

impl StoreData {
    fn list_subjects(&self) -> Vec<Subject> {
        let mut list: Vec<_> = self.subjects.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    fn insert_subject(&mut self, subject: Subject) -> StoreResult<()> {
        if self.subjects.values().any(|s| s.name == subject.name) {
            return Err(StoreError::Conflict {
                entity: "subject",
                key: subject.name,
            });
        }
        self.subjects.insert(subject.id.clone(), subject);
        Ok(())
    }

    fn delete_subject(&mut self, id: &str) -> StoreResult<Subject> {
        let subject = self
            .subjects
            .remove(id)
            .ok_or_else(|| StoreError::not_found("subject", id))?;
        self.topics.retain(|_, topic| topic.subject_id != id);
        Ok(subject)
    }

    fn list_topics(&self) -> Vec<Topic> {
        let mut list: Vec<_> = self.topics.values().cloned().collect();
        list.sort_by(|a, b| {
            a.subject_id
                .cmp(&b.subject_id)
                .then(a.sequence_number.cmp(&b.sequence_number))
        });
        list
    }

    fn find_topic_by_name(&self, name: &str) -> Option<Topic> {
        self.topics.values().find(|t| t.name == name).cloned()
    }

    fn insert_topic(&mut self, topic: Topic) -> StoreResult<()> {
        if !self.subjects.contains_key(&topic.subject_id) {
            return Err(StoreError::not_found("subject", topic.subject_id));
        }
        self.topics.insert(topic.id.clone(), topic);
        Ok(())
    }

    fn delete_topic(&mut self, id: &str) -> StoreResult<Topic> {
        self.topics
            .remove(id)
            .ok_or_else(|| StoreError::not_found("topic", id))
    }

    fn list_quizzes(&self) -> Vec<QuizSummary> {
        let mut list: Vec<_> = self
            .quizzes
            .values()
            .map(|quiz| QuizSummary {
                submission_count: self
                    .submissions
                    .iter()
                    .filter(|s| s.quiz_id == quiz.id)
                    .count(),
                quiz: quiz.clone(),
            })
            .collect();
        list.sort_by(|a, b| b.quiz.created_at.cmp(&a.quiz.created_at));
        list
    }

    fn insert_quiz(&mut self, quiz: Quiz) -> StoreResult<()> {
        if self.quizzes.contains_key(&quiz.id) {
            return Err(StoreError::Conflict {
                entity: "quiz",
                key: quiz.id,
            });
        }
        self.quizzes.insert(quiz.id.clone(), quiz);
        Ok(())
    }

    fn delete_quiz(&mut self, id: &str) -> StoreResult<Quiz> {
        let quiz = self
            .quizzes
            .remove(id)
            .ok_or_else(|| StoreError::not_found("quiz", id))?;
        self.submissions.retain(|s| s.quiz_id != id);
        Ok(quiz)
    }

    fn insert_submission(&mut self, submission: QuizSubmission) -> StoreResult<()> {
        if !self.quizzes.contains_key(&submission.quiz_id) {
            return Err(StoreError::not_found("quiz", submission.quiz_id));
        }
        self.submissions.push(submission);
        Ok(())
    }

    fn insert_debate(&mut self, debate: Debate) -> StoreResult<()> {
        if self.debates.contains_key(&debate.id) {
            return Err(StoreError::Conflict {
                entity: "debate",
                key: debate.id,
            });
        }
        self.debates.insert(debate.id.clone(), debate);
        Ok(())
    }

    fn update_debate(&mut self, debate: Debate) -> StoreResult<()> {
        let slot = self
            .debates
            .get_mut(&debate.id)
            .ok_or_else(|| StoreError::not_found("debate", debate.id.clone()))?;
        *slot = debate;
        Ok(())
    }

    fn list_engagement(&self, student_id: &str) -> Vec<EngagementRecord> {
        self.engagement
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect()
    }
}

/// Wires the `Store` trait onto a backend exposing `read` and `write` closures
/// over `StoreData`.
macro_rules! impl_store_for {
    ($backend:ty) => {
        const _: () = {
            use $crate::store::{
                Debate, EngagementRecord, Quiz, QuizSubmission, QuizSummary, Store, StoreResult,
                Subject, Topic,
            };

            #[async_trait::async_trait]
            impl Store for $backend {
                async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
                    self.read(|data| Ok(data.list_subjects())).await
                }

                async fn get_subject(&self, id: &str) -> StoreResult<Option<Subject>> {
                    self.read(|data| Ok(data.subjects.get(id).cloned())).await
                }

                async fn insert_subject(&self, subject: Subject) -> StoreResult<()> {
                    self.write(|data| data.insert_subject(subject)).await
                }

                async fn delete_subject(&self, id: &str) -> StoreResult<Subject> {
                    self.write(|data| data.delete_subject(id)).await
                }

                async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
                    self.read(|data| Ok(data.list_topics())).await
                }

                async fn get_topic(&self, id: &str) -> StoreResult<Option<Topic>> {
                    self.read(|data| Ok(data.topics.get(id).cloned())).await
                }

                async fn find_topic_by_name(&self, name: &str) -> StoreResult<Option<Topic>> {
                    self.read(|data| Ok(data.find_topic_by_name(name))).await
                }

                async fn insert_topic(&self, topic: Topic) -> StoreResult<()> {
                    self.write(|data| data.insert_topic(topic)).await
                }

                async fn delete_topic(&self, id: &str) -> StoreResult<Topic> {
                    self.write(|data| data.delete_topic(id)).await
                }

                async fn list_quizzes(&self) -> StoreResult<Vec<QuizSummary>> {
                    self.read(|data| Ok(data.list_quizzes())).await
                }

                async fn get_quiz(&self, id: &str) -> StoreResult<Option<Quiz>> {
                    self.read(|data| Ok(data.quizzes.get(id).cloned())).await
                }

                async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<()> {
                    self.write(|data| data.insert_quiz(quiz)).await
                }

                async fn delete_quiz(&self, id: &str) -> StoreResult<Quiz> {
                    self.write(|data| data.delete_quiz(id)).await
                }

                async fn insert_submission(&self, submission: QuizSubmission) -> StoreResult<()> {
                    self.write(|data| data.insert_submission(submission)).await
                }

                async fn get_debate(&self, id: &str) -> StoreResult<Option<Debate>> {
                    self.read(|data| Ok(data.debates.get(id).cloned())).await
                }

                async fn insert_debate(&self, debate: Debate) -> StoreResult<()> {
                    self.write(|data| data.insert_debate(debate)).await
                }

                async fn update_debate(&self, debate: Debate) -> StoreResult<()> {
                    self.write(|data| data.update_debate(debate)).await
                }

                async fn insert_engagement(&self, record: EngagementRecord) -> StoreResult<()> {
                    self.write(|data| {
                        data.engagement.push(record);
                        Ok(())
                    })
                    .await
                }

                async fn list_engagement(&self, student_id: &str) -> StoreResult<Vec<EngagementRecord>> {
                    self.read(|data| Ok(data.list_engagement(student_id))).await
                }
            }
        };
    };
}

pub(crate) use impl_store_for;
