use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::time::primitive_now_utc;
use crate::core::{security, state::AppState};
use crate::db::types::{UserRole, UserStatus};
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) crate::db::models::User);
pub(crate) struct CurrentAdmin(pub(crate) crate::db::models::User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token_hash = security::hash_token(token);
        let access_token = repositories::tokens::find_by_hash(app_state.db(), &token_hash)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to look up access token"))?
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &access_token.user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?
            .ok_or(ApiError::Unauthorized("User not found"))?;

        if user.status != UserStatus::Active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        // Best effort bookkeeping; a failed touch never blocks the request.
        if let Err(err) = repositories::tokens::touch_last_used(
            app_state.db(),
            &access_token.id,
            primitive_now_utc(),
        )
        .await
        {
            tracing::warn!(error = %err, "Failed to touch access token");
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Admin {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

/// Extracts the raw bearer token for endpoints that operate on the presented
/// session itself, such as logout.
pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))
}
