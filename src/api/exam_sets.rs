use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, today_utc};
use crate::db::types::ExamSetStatus;
use crate::repositories;
use crate::schemas::exam_set::{
    ExamSetAccessRequest, ExamSetCreate, ExamSetCreatedResponse, ExamSetResponse, ExamSetUpdate,
};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct ExamSetListQuery {
    #[serde(default)]
    #[serde(alias = "managerId")]
    manager_id: Option<String>,
    #[serde(default)]
    status: Option<ExamSetStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exam_sets).post(create_exam_set))
        .route("/access", post(access_exam_set))
        .route("/:exam_set_id", get(get_exam_set).patch(update_exam_set).delete(delete_exam_set))
}

/// Exam takers open a set with the shared credentials instead of a bearer
/// token, so this route carries no guard.
async fn access_exam_set(
    State(state): State<AppState>,
    Json(payload): Json<ExamSetAccessRequest>,
) -> Result<Json<ExamSetResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam_set = repositories::exam_sets::find_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set"))?
        .ok_or(ApiError::Unauthorized("Invalid exam set credentials"))?;

    let matches = security::verify_password(&payload.password, &exam_set.password_hash)
        .map_err(|e| ApiError::internal(e, "Failed to verify exam set password"))?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid exam set credentials"));
    }

    let items = repositories::exam_sets::items_for_set(state.db(), &exam_set.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set items"))?;

    Ok(Json(ExamSetResponse::from_db(exam_set, items)))
}

async fn list_exam_sets(
    Query(params): Query<ExamSetListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamSetResponse>>, ApiError> {
    let sets =
        repositories::exam_sets::list(state.db(), params.manager_id.as_deref(), params.status)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list exam sets"))?;

    let mut responses = Vec::with_capacity(sets.len());
    for set in sets {
        let items = repositories::exam_sets::items_for_set(state.db(), &set.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch exam set items"))?;
        responses.push(ExamSetResponse::from_db(set, items));
    }

    Ok(Json(responses))
}

async fn create_exam_set(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamSetCreate>,
) -> Result<(StatusCode, Json<ExamSetCreatedResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let manager = repositories::managers::find_by_id(state.db(), &payload.manager_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch manager"))?;
    if manager.is_none() {
        return Err(ApiError::NotFound("Manager not found".to_string()));
    }

    for exam_id in &payload.exam_ids {
        let exam = repositories::exams::find_by_id(state.db(), exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
        if exam.is_none() {
            return Err(ApiError::NotFound(format!("Exam {exam_id} not found")));
        }
    }

    let username = security::generate_exam_set_username();
    let password = security::generate_exam_set_password();
    let password_hash = security::hash_password(&password)
        .map_err(|e| ApiError::internal(e, "Failed to hash exam set password"))?;

    let now = primitive_now_utc();
    let exam_set = repositories::exam_sets::create(
        state.db(),
        repositories::exam_sets::CreateExamSet {
            id: &Uuid::new_v4().to_string(),
            manager_id: &payload.manager_id,
            title: &payload.title,
            description: payload.description,
            assigned_date: payload.assigned_date.unwrap_or_else(today_utc),
            exam_date: payload.exam_date,
            due_date: payload.due_date,
            status: ExamSetStatus::Pending,
            username: &username,
            password_hash: &password_hash,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam set"))?;

    let mut items = Vec::with_capacity(payload.exam_ids.len());
    for (index, exam_id) in payload.exam_ids.iter().enumerate() {
        let item = repositories::exam_sets::create_item(
            state.db(),
            repositories::exam_sets::CreateExamSetItem {
                id: &Uuid::new_v4().to_string(),
                exam_set_id: &exam_set.id,
                exam_id,
                order_index: index as i32,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create exam set item"))?;
        items.push(item);
    }

    let response = ExamSetCreatedResponse {
        username: exam_set.username.clone(),
        exam_set: ExamSetResponse::from_db(exam_set, items),
        password,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_exam_set(
    Path(exam_set_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamSetResponse>, ApiError> {
    let exam_set = repositories::exam_sets::find_by_id(state.db(), &exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set"))?
        .ok_or_else(|| ApiError::NotFound("Exam set not found".to_string()))?;

    let items = repositories::exam_sets::items_for_set(state.db(), &exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set items"))?;

    Ok(Json(ExamSetResponse::from_db(exam_set, items)))
}

async fn update_exam_set(
    Path(exam_set_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamSetUpdate>,
) -> Result<Json<ExamSetResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::exam_sets::find_by_id(state.db(), &exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Exam set not found".to_string()));
    }

    let exam_set = repositories::exam_sets::update(
        state.db(),
        &exam_set_id,
        repositories::exam_sets::UpdateExamSet {
            title: payload.title,
            description: payload.description,
            exam_date: payload.exam_date,
            due_date: payload.due_date,
            status: payload.status,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam set"))?;

    let items = repositories::exam_sets::items_for_set(state.db(), &exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set items"))?;

    Ok(Json(ExamSetResponse::from_db(exam_set, items)))
}

async fn delete_exam_set(
    Path(exam_set_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::exam_sets::delete(state.db(), &exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam set"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam set not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Exam set deleted".to_string() }))
}
