use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{ExamSet, ExamSetItem};
use crate::db::types::{ExamSetStatus, ProgressStatus};
use crate::schemas::deserialize_option_date;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSetCreate {
    #[serde(alias = "managerId")]
    #[validate(length(min = 1, message = "manager_id must not be empty"))]
    pub(crate) manager_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default, alias = "assignedDate", deserialize_with = "deserialize_option_date")]
    pub(crate) assigned_date: Option<Date>,
    #[serde(default, alias = "examDate", deserialize_with = "deserialize_option_date")]
    pub(crate) exam_date: Option<Date>,
    #[serde(default, alias = "dueDate", deserialize_with = "deserialize_option_date")]
    pub(crate) due_date: Option<Date>,
    #[serde(alias = "examIds")]
    #[validate(length(min = 1, message = "exam_ids must not be empty"))]
    pub(crate) exam_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSetUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default, alias = "examDate", deserialize_with = "deserialize_option_date")]
    pub(crate) exam_date: Option<Date>,
    #[serde(default, alias = "dueDate", deserialize_with = "deserialize_option_date")]
    pub(crate) due_date: Option<Date>,
    #[serde(default)]
    pub(crate) status: Option<ExamSetStatus>,
}

/// Shared credentials handed to the exam taker at creation time.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSetAccessRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSetResponse {
    pub(crate) id: String,
    pub(crate) manager_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) assigned_date: String,
    pub(crate) exam_date: Option<String>,
    pub(crate) due_date: Option<String>,
    pub(crate) status: ExamSetStatus,
    pub(crate) username: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) items: Vec<ExamSetItemResponse>,
}

impl ExamSetResponse {
    pub(crate) fn from_db(exam_set: ExamSet, items: Vec<ExamSetItem>) -> Self {
        Self {
            id: exam_set.id,
            manager_id: exam_set.manager_id,
            title: exam_set.title,
            description: exam_set.description,
            assigned_date: format_date(exam_set.assigned_date),
            exam_date: exam_set.exam_date.map(format_date),
            due_date: exam_set.due_date.map(format_date),
            status: exam_set.status,
            username: exam_set.username,
            created_at: format_primitive(exam_set.created_at),
            updated_at: format_primitive(exam_set.updated_at),
            items: items.into_iter().map(ExamSetItemResponse::from_db).collect(),
        }
    }
}

/// Returned exactly once, from the create endpoint. The password is only
/// stored as an argon2 hash afterwards.
#[derive(Debug, Serialize)]
pub(crate) struct ExamSetCreatedResponse {
    pub(crate) exam_set: ExamSetResponse,
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSetItemResponse {
    pub(crate) id: String,
    pub(crate) exam_set_id: String,
    pub(crate) exam_id: String,
    pub(crate) order_index: i32,
    pub(crate) status: ProgressStatus,
}

impl ExamSetItemResponse {
    pub(crate) fn from_db(item: ExamSetItem) -> Self {
        Self {
            id: item.id,
            exam_set_id: item.exam_set_id,
            exam_id: item.exam_id,
            order_index: item.order_index,
            status: item.status,
        }
    }
}
