/*
[INPUT]:  Quiz definitions, student answers, generated quizzes, injected Store
[OUTPUT]: Stored quizzes, listings with submission counts, scored submissions
[POS]:    Service layer - quiz CRUD and local scoring
[UPDATE]: When quiz fields or scoring rules change
*/

use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::store::{Quiz, QuizSubmission, QuizSummary, Store, StoredQuestion};
use chrono::Utc;
use edutask_adapter::{Quiz as GeneratedQuiz, QuestionType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
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

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuiz {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub class_id: Option<String>,
    pub created_by: String,
    pub questions: Vec<NewQuestion>,
}

/// Percentage of points earned, rounded to two places; zero when the quiz
/// carries no points. Answers must match the correct answer exactly.
pub fn score_answers(
    questions: &[StoredQuestion],
    answers: &BTreeMap<String, String>,
) -> ServiceResult<Decimal> {
    let overflow = || ServiceError::validation("quiz points are too large to score");

    let mut earned = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for q in questions {
        total = total.checked_add(q.points).ok_or_else(overflow)?;
        if answers.get(&q.id) == Some(&q.correct_answer) {
            earned = earned.checked_add(q.points).ok_or_else(overflow)?;
        }
    }

    if total.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = earned.checked_div(total).ok_or_else(overflow)?;
    let percent = ratio.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(overflow)?;
    Ok(percent.round_dp(2))
}

pub struct QuizService {
    store: Arc<dyn Store>,
}

impl QuizService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_quiz(&self, new: NewQuiz) -> ServiceResult<Quiz> {
        if new.title.trim().is_empty() {
            return Err(ServiceError::validation("quiz title cannot be empty"));
        }
        if new.created_by.trim().is_empty() {
            return Err(ServiceError::validation("quiz creator cannot be empty"));
        }
        if new.questions.iter().any(|q| q.points.is_sign_negative()) {
            return Err(ServiceError::validation("question points cannot be negative"));
        }

        let questions = new
            .questions
            .into_iter()
            .map(|q| StoredQuestion {
                id: uuid::Uuid::new_v4().to_string(),
                question_text: q.question_text,
                question_type: q.question_type,
                correct_answer: q.correct_answer,
                options: q.options,
                points: q.points,
                topic_id: q.topic_id,
                difficulty: q.difficulty,
            })
            .collect();

        let quiz = Quiz {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            description: new.description,
            duration_minutes: new.duration_minutes,
            class_id: new.class_id,
            created_by: new.created_by,
            is_ai_generated: false,
            questions,
            created_at: Utc::now(),
        };
        self.store.insert_quiz(quiz.clone()).await?;
        info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz created");
        Ok(quiz)
    }

    /// Keep a quiz produced by the generation task, reusing its ids
    pub async fn import_generated(
        &self,
        generated: &GeneratedQuiz,
        created_by: &str,
        duration_minutes: u32,
    ) -> ServiceResult<Quiz> {
        let mut questions = Vec::with_capacity(generated.questions.len());
        for q in &generated.questions {
            let points = Decimal::try_from(q.marks)
                .ok()
                .filter(|points| *points >= Decimal::ZERO)
                .ok_or_else(|| {
                    ServiceError::validation(format!("question {} has invalid marks", q.question_id))
                })?;
            questions.push(StoredQuestion {
                id: q.question_id.clone(),
                question_text: q.text.clone(),
                question_type: q.question_type,
                correct_answer: q.correct_answer.clone(),
                options: q.options.clone(),
                points,
                topic_id: None,
                difficulty: Some(q.difficulty.clone()),
            });
        }

        let metadata = &generated.metadata;
        let title = match &metadata.topic {
            Some(topic) => format!("{} - {}", metadata.subject, topic),
            None => metadata.subject.clone(),
        };

        let quiz = Quiz {
            id: generated.quiz_id.clone(),
            title,
            description: format!("{} class {}", metadata.board, metadata.class_name),
            duration_minutes,
            class_id: None,
            created_by: created_by.to_string(),
            is_ai_generated: true,
            questions,
            created_at: Utc::now(),
        };
        self.store.insert_quiz(quiz.clone()).await?;
        info!(quiz_id = %quiz.id, "generated quiz imported");
        Ok(quiz)
    }

    /// Newest first, with submission counts
    pub async fn list_quizzes(&self) -> ServiceResult<Vec<QuizSummary>> {
        Ok(self.store.list_quizzes().await?)
    }

    pub async fn delete_quiz(&self, id: &str) -> ServiceResult<Quiz> {
        Ok(self.store.delete_quiz(id).await?)
    }

    pub async fn submit_quiz(
        &self,
        quiz_id: &str,
        student_id: &str,
        answers: BTreeMap<String, String>,
    ) -> ServiceResult<QuizSubmission> {
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| StoreError::not_found("quiz", quiz_id))?;

        let submission = QuizSubmission {
            id: uuid::Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            student_id: student_id.to_string(),
            score: score_answers(&quiz.questions, &answers)?,
            answers,
            submitted_at: Utc::now(),
        };
        self.store.insert_submission(submission.clone()).await?;
        info!(quiz_id, student_id, score = %submission.score, "quiz submitted");
        Ok(submission)
    }
}
