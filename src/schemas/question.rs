use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionType};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    #[serde(default)]
    pub(crate) options: Option<Vec<String>>,
    #[serde(alias = "correctAnswer")]
    #[validate(length(min = 1, message = "correct_answer must not be empty"))]
    pub(crate) correct_answer: String,
    #[validate(range(min = 0, message = "score must be non-negative"))]
    pub(crate) score: i32,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub(crate) category: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) question_type: Option<QuestionType>,
    #[serde(default)]
    pub(crate) options: Option<Vec<String>>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    #[validate(length(min = 1, message = "correct_answer must not be empty"))]
    pub(crate) correct_answer: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "score must be non-negative"))]
    pub(crate) score: Option<i32>,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub(crate) category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) question: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: String,
    pub(crate) score: i32,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) category: String,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            question: question.question,
            question_type: question.question_type,
            options: question.options.map(|options| options.0),
            correct_answer: question.correct_answer,
            score: question.score,
            difficulty: question.difficulty,
            category: question.category,
            created_by: question.created_by,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}
