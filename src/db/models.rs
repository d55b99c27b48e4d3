use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{
    AssignmentStatus, CompanyStatus, DifficultyLevel, ExamSetStatus, ExamStatus, ManagerStatus,
    ProgressStatus, QuestionType, ResultStatus, UserRole, UserStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) phone: String,
    pub(crate) name: String,
    pub(crate) avatar: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) status: UserStatus,
    pub(crate) last_login: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Opaque bearer token; only the SHA-256 digest of the issued value is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AccessToken {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) token_hash: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) last_used_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct OtpCode {
    pub(crate) id: String,
    pub(crate) phone: String,
    pub(crate) code: String,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) verified_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Company {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) legal_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) economic_code: Option<String>,
    pub(crate) field_of_activity: Option<String>,
    pub(crate) logo: Option<String>,
    pub(crate) website: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) owner_id: String,
    pub(crate) status: CompanyStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Manager {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) company_id: String,
    pub(crate) position: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) status: ManagerStatus,
    pub(crate) assessment_status: ProgressStatus,
    pub(crate) exam_status: ProgressStatus,
    pub(crate) can_view_results: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) status: ExamStatus,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) question: String,
    #[sqlx(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Json<Vec<String>>>,
    pub(crate) correct_answer: String,
    pub(crate) score: i32,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) category: String,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamSet {
    pub(crate) id: String,
    pub(crate) manager_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) assigned_date: Date,
    pub(crate) exam_date: Option<Date>,
    pub(crate) due_date: Option<Date>,
    pub(crate) status: ExamSetStatus,
    pub(crate) username: String,
    #[serde(skip_serializing)]
    pub(crate) password_hash: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamSetItem {
    pub(crate) id: String,
    pub(crate) exam_set_id: String,
    pub(crate) exam_id: String,
    pub(crate) order_index: i32,
    pub(crate) status: ProgressStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamAssignment {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) manager_id: String,
    pub(crate) assigned_date: Date,
    pub(crate) due_date: Option<Date>,
    pub(crate) status: AssignmentStatus,
    pub(crate) attempts: i32,
    pub(crate) max_attempts: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamResult {
    pub(crate) id: String,
    pub(crate) exam_set_id: String,
    pub(crate) exam_id: String,
    pub(crate) manager_id: String,
    pub(crate) answers: Json<HashMap<String, serde_json::Value>>,
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) percentage: f64,
    pub(crate) status: ResultStatus,
    pub(crate) started_at: Option<PrimitiveDateTime>,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) time_spent: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
