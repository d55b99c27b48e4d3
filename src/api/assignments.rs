use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, today_utc};
use crate::db::types::AssignmentStatus;
use crate::repositories;
use crate::schemas::assignment::{
    AssignmentCreate, AssignmentResponse, AssignmentUpdate, BulkAssignResponse,
};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentListQuery {
    #[serde(default)]
    #[serde(alias = "examId")]
    exam_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "managerId")]
    manager_id: Option<String>,
    #[serde(default)]
    status: Option<AssignmentStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments).post(create_assignments))
        .route(
            "/:assignment_id",
            get(get_assignment).patch(update_assignment).delete(delete_assignment),
        )
        .route("/:assignment_id/start", post(start_assignment))
        .route("/:assignment_id/complete", post(complete_assignment))
}

async fn list_assignments(
    Query(params): Query<AssignmentListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = repositories::assignments::list(
        state.db(),
        params.exam_id.as_deref(),
        params.manager_id.as_deref(),
        params.status,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

/// Bulk assignment: pairs that already exist are skipped, not errors.
async fn create_assignments(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<BulkAssignResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = repositories::exams::find_by_id(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
    if exam.is_none() {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let now = primitive_now_utc();
    let assigned_date = today_utc();
    let mut assigned = Vec::new();
    let mut skipped = Vec::new();

    for manager_id in &payload.manager_ids {
        let manager = repositories::managers::find_by_id(state.db(), manager_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch manager"))?;
        if manager.is_none() {
            return Err(ApiError::NotFound(format!("Manager {manager_id} not found")));
        }

        let id = Uuid::new_v4().to_string();
        let created = repositories::assignments::create(
            state.db(),
            repositories::assignments::CreateAssignment {
                id: &id,
                exam_id: &payload.exam_id,
                manager_id,
                assigned_date,
                due_date: payload.due_date,
                max_attempts: payload.max_attempts,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

        if created {
            let assignment = repositories::assignments::fetch_one_by_id(state.db(), &id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch created assignment"))?;
            assigned.push(AssignmentResponse::from_db(assignment));
        } else {
            skipped.push(manager_id.clone());
        }
    }

    Ok((StatusCode::CREATED, Json(BulkAssignResponse { assigned, skipped })))
}

async fn get_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = repositories::assignments::find_by_id(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(AssignmentResponse::from_db(assignment)))
}

async fn update_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentUpdate>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::assignments::find_by_id(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    let assignment = repositories::assignments::update(
        state.db(),
        &assignment_id,
        repositories::assignments::UpdateAssignment {
            due_date: payload.due_date,
            status: payload.status,
            max_attempts: payload.max_attempts,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update assignment"))?;

    Ok(Json(AssignmentResponse::from_db(assignment)))
}

async fn delete_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::assignments::delete(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;

    if !deleted {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Assignment deleted".to_string() }))
}

/// The transition itself is a single conditional UPDATE; on failure the row
/// is refetched only to pick the right error.
async fn start_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let started = repositories::assignments::start_transition(
        state.db(),
        &assignment_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to start assignment"))?;

    if !started {
        let assignment = repositories::assignments::find_by_id(state.db(), &assignment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
            .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

        if assignment.status != AssignmentStatus::Assigned {
            return Err(ApiError::Conflict(
                "Assignment is not in an assignable state".to_string(),
            ));
        }
        return Err(ApiError::Forbidden("Maximum attempts reached"));
    }

    let assignment = repositories::assignments::fetch_one_by_id(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch started assignment"))?;

    Ok(Json(AssignmentResponse::from_db(assignment)))
}

async fn complete_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let existing = repositories::assignments::find_by_id(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    if existing.status == AssignmentStatus::Completed {
        return Err(ApiError::Conflict("Assignment is already completed".to_string()));
    }

    repositories::assignments::complete_transition(state.db(), &assignment_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to complete assignment"))?;

    let assignment = repositories::assignments::fetch_one_by_id(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch completed assignment"))?;

    Ok(Json(AssignmentResponse::from_db(assignment)))
}
