use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Manager;
use crate::db::types::{ManagerStatus, ProgressStatus};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ManagerCreate {
    #[serde(alias = "userId")]
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub(crate) user_id: String,
    #[serde(alias = "companyId")]
    #[validate(length(min = 1, message = "company_id must not be empty"))]
    pub(crate) company_id: String,
    #[serde(default)]
    pub(crate) position: Option<String>,
    #[serde(default)]
    pub(crate) department: Option<String>,
    #[serde(default)]
    #[serde(alias = "canViewResults")]
    pub(crate) can_view_results: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManagerUpdate {
    #[serde(default)]
    pub(crate) position: Option<String>,
    #[serde(default)]
    pub(crate) department: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<ManagerStatus>,
    #[serde(default)]
    #[serde(alias = "assessmentStatus")]
    pub(crate) assessment_status: Option<ProgressStatus>,
    #[serde(default)]
    #[serde(alias = "examStatus")]
    pub(crate) exam_status: Option<ProgressStatus>,
    #[serde(default)]
    #[serde(alias = "canViewResults")]
    pub(crate) can_view_results: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ManagerResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) company_id: String,
    pub(crate) position: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) status: ManagerStatus,
    pub(crate) assessment_status: ProgressStatus,
    pub(crate) exam_status: ProgressStatus,
    pub(crate) can_view_results: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ManagerResponse {
    pub(crate) fn from_db(manager: Manager) -> Self {
        Self {
            id: manager.id,
            user_id: manager.user_id,
            company_id: manager.company_id,
            position: manager.position,
            department: manager.department,
            status: manager.status,
            assessment_status: manager.assessment_status,
            exam_status: manager.exam_status,
            can_view_results: manager.can_view_results,
            created_at: format_primitive(manager.created_at),
            updated_at: format_primitive(manager.updated_at),
        }
    }
}
