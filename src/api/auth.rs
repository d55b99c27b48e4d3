use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{self, CurrentUser};
use crate::api::validation::{validate_code_len, validate_image_upload, validate_phone};
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::{UserRole, UserStatus};
use crate::repositories;
use crate::schemas::auth::{SendOtpRequest, SendOtpResponse, TokenResponse, VerifyOtpRequest};
use crate::schemas::user::UserResponse;
use crate::schemas::MessageResponse;
use crate::services::otp;
use crate::services::storage::{AvatarStore, StorageError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    validate_phone(&payload.phone)?;

    let issued = otp::issue(state.db(), state.settings(), &payload.phone)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to issue OTP code"))?;

    let issued = match issued {
        otp::IssueOutcome::Issued(issued) => issued,
        otp::IssueOutcome::RateLimited => {
            return Err(ApiError::TooManyRequests("Too many codes requested, try again later"));
        }
    };

    let is_registered = repositories::users::exists_by_phone(state.db(), &payload.phone)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;

    if let Err(err) = state.sms().send_otp(&payload.phone, &issued.code).await {
        // Delivery is best effort; the code stays valid either way.
        tracing::warn!(error = %err, "Failed to deliver OTP over SMS");
    }

    let code = state.settings().expose_otp_code().then_some(issued.code);

    Ok(Json(SendOtpResponse {
        message: "Verification code sent".to_string(),
        expires_at: format_primitive(issued.expires_at),
        is_registered,
        code,
    }))
}

/// Registration submits the optional profile avatar together with the code,
/// so this endpoint accepts multipart form data as well as plain JSON.
async fn verify_otp(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = read_verify_payload(request).await?;

    validate_phone(&payload.phone)?;
    validate_code_len(&payload.code)?;
    if let Some(avatar) = payload.avatar.as_ref() {
        validate_image_upload(
            &avatar.filename,
            &avatar.content_type,
            &state.settings().storage().allowed_image_extensions,
        )?;
    }

    let claimed = otp::verify(state.db(), &payload.phone, &payload.code)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to verify OTP code"))?;

    if !claimed {
        return Err(ApiError::Unauthorized("Invalid or expired verification code"));
    }

    let user = find_or_create_user(&state, &payload).await?;

    if user.status != UserStatus::Active {
        return Err(ApiError::Forbidden("Account is not active"));
    }

    let now = primitive_now_utc();
    repositories::users::touch_last_login(state.db(), &user.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record login"))?;

    let token = security::generate_token();
    repositories::tokens::create(
        state.db(),
        repositories::tokens::CreateToken {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            token_hash: &security::hash_token(&token),
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let user = repositories::users::fetch_one_by_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload user"))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    CurrentUser(_user): CurrentUser,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let token = guards::bearer_token(&headers)?;

    repositories::tokens::delete_by_hash(state.db(), &security::hash_token(token))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to revoke access token"))?;

    Ok((StatusCode::OK, Json(MessageResponse { message: "Logged out".to_string() })))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

struct AvatarUpload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

struct VerifyOtpPayload {
    phone: String,
    code: String,
    name: Option<String>,
    avatar: Option<AvatarUpload>,
}

async fn read_verify_payload(request: Request) -> Result<VerifyOtpPayload, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with("multipart/form-data") {
        let Json(body) = Json::<VerifyOtpRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON payload: {e}")))?;
        return Ok(VerifyOtpPayload {
            phone: body.phone,
            code: body.code,
            name: body.name,
            avatar: None,
        });
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?;

    let mut phone = None;
    let mut code = None;
    let mut name = None;
    let mut avatar = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "phone" => phone = Some(read_text_field(field, "phone").await?),
            "code" => code = Some(read_text_field(field, "code").await?),
            "name" => name = Some(read_text_field(field, "name").await?),
            "avatar" => {
                let filename = field
                    .file_name()
                    .map(|value| value.to_string())
                    .ok_or_else(|| ApiError::BadRequest("Avatar file must have a name".to_string()))?;
                let content_type =
                    field.content_type().map(|value| value.to_string()).unwrap_or_default();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read avatar upload: {e}"))
                })?;
                avatar = Some(AvatarUpload { filename, content_type, bytes });
            }
            _ => {}
        }
    }

    Ok(VerifyOtpPayload {
        phone: phone.ok_or_else(|| ApiError::BadRequest("phone is required".to_string()))?,
        code: code.ok_or_else(|| ApiError::BadRequest("code is required".to_string()))?,
        name,
        avatar,
    })
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field.text().await.map_err(|e| ApiError::BadRequest(format!("Invalid {name} field: {e}")))
}

/// First verified login registers the phone; the display name defaults to the
/// trailing digits until the user sets one and the avatar, when supplied, is
/// stored only for this newly created account.
async fn find_or_create_user(
    state: &AppState,
    payload: &VerifyOtpPayload,
) -> Result<User, ApiError> {
    if let Some(user) = repositories::users::find_by_phone(state.db(), &payload.phone)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
    {
        return Ok(user);
    }

    let avatar_path = match payload.avatar.as_ref() {
        Some(upload) => {
            let store = AvatarStore::from_settings(state.settings());
            match store.save(&upload.filename, &upload.bytes).await {
                Ok(path) => Some(path),
                Err(err @ StorageError::UnsupportedExtension(_))
                | Err(err @ StorageError::TooLarge { .. }) => {
                    return Err(ApiError::BadRequest(err.to_string()));
                }
                Err(err) => return Err(ApiError::internal(err, "Failed to store avatar")),
            }
        }
        None => None,
    };

    let phone = payload.phone.as_str();
    let default_name = format!("User {}", &phone[phone.len() - 4..]);
    let now = primitive_now_utc();

    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            phone,
            name: payload
                .name
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(&default_name),
            avatar: avatar_path.as_deref(),
            role: UserRole::Owner,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))
}
