/*
[INPUT]:  Compute service schema definitions and serde requirements
[OUTPUT]: Typed Rust model structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::enums::QuestionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizMetadata {
    pub generated_at: String,
    pub board: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub student_level: String,
    pub student_ability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: String,
    pub marks: f64,
    #[serde(default)]
    pub solution_steps: String,
    #[serde(default)]
    pub irt_a: f64,
    #[serde(default)]
    pub irt_b: f64,
}

/// Quiz produced by the generation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz_id: String,
    pub metadata: QuizMetadata,
    pub questions: Vec<Question>,
}

/// Outcome of the evaluation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub score: f64,
    pub total_marks: f64,
    pub percentage: f64,
    pub updated_ability: f64,
    pub updated_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAbility {
    pub ability: f64,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: f64,
    pub total_marks: f64,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub timestamp: String,
}

pub type StudentHistory = BTreeMap<String, HistoryEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineResult {
    pub morning_routine: String,
    /// Subject -> time slot
    pub study_plan: BTreeMap<String, String>,
    pub exercise: String,
    pub evening_routine: String,
    pub productivity_tips: String,
}

/// Study guide document; its shape belongs to the model prompt
pub type StudyGuide = serde_json::Value;

/// Engagement observation sent to the micro-goal optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSample {
    pub topic: String,
    pub time_spent: f64,
    pub engagement_score: f64,
    pub interactions: Vec<String>,
}
