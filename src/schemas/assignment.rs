use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::ExamAssignment;
use crate::db::types::AssignmentStatus;
use crate::schemas::deserialize_option_date;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[serde(alias = "examId")]
    #[validate(length(min = 1, message = "exam_id must not be empty"))]
    pub(crate) exam_id: String,
    #[serde(alias = "managerIds")]
    #[validate(length(min = 1, message = "manager_ids must not be empty"))]
    pub(crate) manager_ids: Vec<String>,
    #[serde(default, alias = "dueDate", deserialize_with = "deserialize_option_date")]
    pub(crate) due_date: Option<Date>,
    #[serde(default = "default_max_attempts")]
    #[serde(alias = "maxAttempts")]
    #[validate(range(min = 1, message = "max_attempts must be positive"))]
    pub(crate) max_attempts: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentUpdate {
    #[serde(default, alias = "dueDate", deserialize_with = "deserialize_option_date")]
    pub(crate) due_date: Option<Date>,
    #[serde(default)]
    pub(crate) status: Option<AssignmentStatus>,
    #[serde(default)]
    #[serde(alias = "maxAttempts")]
    #[validate(range(min = 1, message = "max_attempts must be positive"))]
    pub(crate) max_attempts: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) manager_id: String,
    pub(crate) assigned_date: String,
    pub(crate) due_date: Option<String>,
    pub(crate) status: AssignmentStatus,
    pub(crate) attempts: i32,
    pub(crate) max_attempts: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: ExamAssignment) -> Self {
        Self {
            id: assignment.id,
            exam_id: assignment.exam_id,
            manager_id: assignment.manager_id,
            assigned_date: format_date(assignment.assigned_date),
            due_date: assignment.due_date.map(format_date),
            status: assignment.status,
            attempts: assignment.attempts,
            max_attempts: assignment.max_attempts,
            created_at: format_primitive(assignment.created_at),
            updated_at: format_primitive(assignment.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkAssignResponse {
    pub(crate) assigned: Vec<AssignmentResponse>,
    /// Managers that already had this exam assigned.
    pub(crate) skipped: Vec<String>,
}

fn default_max_attempts() -> i32 {
    1
}
