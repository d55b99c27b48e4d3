use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::ManagerStatus;
use crate::repositories;
use crate::schemas::manager::{ManagerCreate, ManagerResponse, ManagerUpdate};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct ManagerListQuery {
    #[serde(default)]
    #[serde(alias = "companyId")]
    company_id: Option<String>,
    #[serde(default)]
    status: Option<ManagerStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_managers).post(create_manager))
        .route("/:manager_id", get(get_manager).patch(update_manager).delete(delete_manager))
}

async fn list_managers(
    Query(params): Query<ManagerListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ManagerResponse>>, ApiError> {
    let managers =
        repositories::managers::list(state.db(), params.company_id.as_deref(), params.status)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list managers"))?;

    Ok(Json(managers.into_iter().map(ManagerResponse::from_db).collect()))
}

async fn create_manager(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ManagerCreate>,
) -> Result<(StatusCode, Json<ManagerResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let linked_user = repositories::users::find_by_id(state.db(), &payload.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;
    if linked_user.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let company = repositories::companies::find_by_id(state.db(), &payload.company_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch company"))?;
    if company.is_none() {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    let now = primitive_now_utc();
    let manager = repositories::managers::create(
        state.db(),
        repositories::managers::CreateManager {
            id: &Uuid::new_v4().to_string(),
            user_id: &payload.user_id,
            company_id: &payload.company_id,
            position: payload.position,
            department: payload.department,
            status: ManagerStatus::Active,
            can_view_results: payload.can_view_results,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create manager"))?;

    Ok((StatusCode::CREATED, Json(ManagerResponse::from_db(manager))))
}

async fn get_manager(
    Path(manager_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ManagerResponse>, ApiError> {
    let manager = repositories::managers::find_by_id(state.db(), &manager_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch manager"))?
        .ok_or_else(|| ApiError::NotFound("Manager not found".to_string()))?;

    Ok(Json(ManagerResponse::from_db(manager)))
}

async fn update_manager(
    Path(manager_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ManagerUpdate>,
) -> Result<Json<ManagerResponse>, ApiError> {
    let existing = repositories::managers::find_by_id(state.db(), &manager_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch manager"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Manager not found".to_string()));
    }

    let manager = repositories::managers::update(
        state.db(),
        &manager_id,
        repositories::managers::UpdateManager {
            position: payload.position,
            department: payload.department,
            status: payload.status,
            assessment_status: payload.assessment_status,
            exam_status: payload.exam_status,
            can_view_results: payload.can_view_results,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update manager"))?;

    Ok(Json(ManagerResponse::from_db(manager)))
}

async fn delete_manager(
    Path(manager_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::managers::delete(state.db(), &manager_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete manager"))?;

    if !deleted {
        return Err(ApiError::NotFound("Manager not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Manager deleted".to_string() }))
}
