use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::ExamResult;
use crate::db::types::{QuestionType, ResultStatus};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ResultStart {
    #[serde(alias = "examSetId")]
    #[validate(length(min = 1, message = "exam_set_id must not be empty"))]
    pub(crate) exam_set_id: String,
    #[serde(alias = "examId")]
    #[validate(length(min = 1, message = "exam_id must not be empty"))]
    pub(crate) exam_id: String,
    #[serde(alias = "managerId")]
    #[validate(length(min = 1, message = "manager_id must not be empty"))]
    pub(crate) manager_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveAnswersRequest {
    pub(crate) answers: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub(crate) answers: HashMap<String, serde_json::Value>,
}

/// Duplicate-start conflict body; carries the attempt that already exists for
/// the (exam set, exam, manager) triple.
#[derive(Debug, Serialize)]
pub(crate) struct ResultConflictResponse {
    pub(crate) status: u16,
    pub(crate) detail: String,
    pub(crate) result: ResultResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse {
    pub(crate) id: String,
    pub(crate) exam_set_id: String,
    pub(crate) exam_id: String,
    pub(crate) manager_id: String,
    pub(crate) answers: HashMap<String, serde_json::Value>,
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) percentage: f64,
    pub(crate) status: ResultStatus,
    pub(crate) started_at: Option<String>,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent_minutes: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ResultResponse {
    pub(crate) fn from_db(result: ExamResult) -> Self {
        Self {
            id: result.id,
            exam_set_id: result.exam_set_id,
            exam_id: result.exam_id,
            manager_id: result.manager_id,
            answers: result.answers.0,
            score: result.score,
            total_score: result.total_score,
            percentage: result.percentage,
            status: result.status,
            started_at: result.started_at.map(format_primitive),
            completed_at: result.completed_at.map(format_primitive),
            time_spent_minutes: result.time_spent,
            created_at: format_primitive(result.created_at),
            updated_at: format_primitive(result.updated_at),
        }
    }
}

/// Compact view returned from submission.
#[derive(Debug, Serialize)]
pub(crate) struct ResultSummaryResponse {
    pub(crate) id: String,
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) percentage: f64,
    pub(crate) status: ResultStatus,
    pub(crate) passed: bool,
    pub(crate) time_spent_minutes: i32,
}

impl ResultSummaryResponse {
    pub(crate) fn from_db(result: ExamResult) -> Self {
        Self {
            id: result.id,
            score: result.score,
            total_score: result.total_score,
            percentage: result.percentage,
            passed: result.status == ResultStatus::Passed,
            status: result.status,
            time_spent_minutes: result.time_spent,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportRow {
    pub(crate) question_id: String,
    pub(crate) question: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) correct_answer: String,
    pub(crate) given_answer: Option<serde_json::Value>,
    pub(crate) score: i32,
    pub(crate) earned: i32,
    pub(crate) correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultReportResponse {
    pub(crate) result: ResultResponse,
    pub(crate) questions: Vec<ReportRow>,
}
