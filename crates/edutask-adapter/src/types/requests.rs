/*
[INPUT]:  Compute service schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::enums::{DebateAction, Stance};
use super::models::EngagementSample;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl QuizRequest {
    /// Blank topics are treated as "whole subject"
    pub fn new(subject: impl Into<String>, topic: Option<&str>) -> Self {
        Self {
            subject: subject.into(),
            topic: topic
                .map(str::trim)
                .filter(|topic| !topic.is_empty())
                .map(str::to_string),
        }
    }
}

/// Answers to a generated quiz, keyed by `question_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEvaluationRequest {
    pub quiz_id: String,
    pub responses: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineRequest {
    pub age: u32,
    /// "HH:MM"
    pub sleep_time: String,
    /// "HH:MM"
    pub wake_time: String,
    pub study_hours: f64,
    /// Minutes
    pub exercise_time: f64,
    /// Comma-separated subject list
    pub subjects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub filename: String,
    #[serde(rename = "type")]
    pub material_type: String,
    pub description: String,
    pub date_added: String,
    pub topics: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "Intermediate".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllabusModule {
    pub weight: String,
    pub objectives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    pub course_name: String,
    pub exam_type: String,
    pub exam_date: String,
    pub duration: String,
    pub format: String,
    pub modules: BTreeMap<String, SyllabusModule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPrepRequest {
    pub course_materials: Vec<Material>,
    pub syllabus: Syllabus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRequest {
    pub topic: String,
    pub stance: Stance,
    pub cards: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<DebateAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroGoalRequest {
    pub learning_objective: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_data: Option<Vec<EngagementSample>>,
}
