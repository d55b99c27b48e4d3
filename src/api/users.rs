use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::validate_image_upload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::{UserRole, UserStatus};
use crate::repositories;
use crate::schemas::user::{AdminUserUpdate, UserResponse, UserUpdate};
use crate::services::storage::{AvatarStore, StorageError};

#[derive(Debug, Deserialize)]
pub(crate) struct UserListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
    #[serde(default)]
    status: Option<UserStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", patch(update_me))
        .route("/me/avatar", post(upload_avatar))
        .route("/", get(list_users))
        .route("/:user_id", get(get_user).patch(update_user))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::users::update(
        state.db(),
        &user.id,
        repositories::users::UpdateUser {
            name: payload.name,
            role: None,
            status: None,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update profile"))?;

    Ok(Json(UserResponse::from_db(updated)))
}

async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?
        .ok_or_else(|| ApiError::BadRequest("Avatar file is required".to_string()))?;

    let filename = field
        .file_name()
        .map(|name| name.to_string())
        .ok_or_else(|| ApiError::BadRequest("Avatar file must have a name".to_string()))?;
    let content_type = field.content_type().map(|value| value.to_string()).unwrap_or_default();

    validate_image_upload(
        &filename,
        &content_type,
        &state.settings().storage().allowed_image_extensions,
    )?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read avatar upload: {e}")))?;

    let store = AvatarStore::from_settings(state.settings());
    let stored_path = match store.save(&filename, &bytes).await {
        Ok(path) => path,
        Err(err @ StorageError::UnsupportedExtension(_)) => {
            return Err(ApiError::BadRequest(err.to_string()));
        }
        Err(err @ StorageError::TooLarge { .. }) => {
            return Err(ApiError::BadRequest(err.to_string()));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to store avatar")),
    };

    if let Some(previous) = user.avatar.as_deref() {
        if let Err(err) = store.remove(previous).await {
            tracing::warn!(error = %err, "Failed to remove previous avatar");
        }
    }

    let updated =
        repositories::users::set_avatar(state.db(), &user.id, &stored_path, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update avatar"))?;

    Ok(Json(UserResponse::from_db(updated)))
}

async fn list_users(
    Query(params): Query<UserListQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT id, phone, name, avatar, role, status, last_login, created_at, updated_at
         FROM users WHERE TRUE",
    );

    if let Some(phone) = params.phone.as_ref() {
        builder.push(" AND phone = ");
        builder.push_bind(phone);
    }
    if let Some(role) = params.role {
        builder.push(" AND role = ");
        builder.push_bind(role);
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.push(" OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    let users = builder
        .build_query_as::<User>()
        .fetch_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

async fn get_user(
    Path(user_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    Ok(Json(UserResponse::from_db(user)))
}

async fn update_user(
    Path(user_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    if existing.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let updated = repositories::users::update(
        state.db(),
        &user_id,
        repositories::users::UpdateUser {
            name: payload.name,
            role: payload.role,
            status: payload.status,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update user"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %updated.id,
        action = "user_update",
        "Admin updated user"
    );

    Ok(Json(UserResponse::from_db(updated)))
}

fn default_limit() -> i64 {
    100
}
