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
use crate::db::types::{CompanyStatus, UserRole};
use crate::repositories;
use crate::schemas::company::{CompanyCreate, CompanyResponse, CompanyUpdate};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyListQuery {
    #[serde(default)]
    status: Option<CompanyStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/my", get(my_companies))
        .route("/:company_id", get(get_company).patch(update_company).delete(delete_company))
}

async fn list_companies(
    Query(params): Query<CompanyListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = if user.role == UserRole::Admin {
        repositories::companies::list(state.db(), params.status).await
    } else {
        repositories::companies::list_by_owner(state.db(), &user.id).await
    }
    .map_err(|e| ApiError::internal(e, "Failed to list companies"))?;

    Ok(Json(companies.into_iter().map(CompanyResponse::from_db).collect()))
}

async fn my_companies(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = repositories::companies::list_by_owner(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list companies"))?;

    Ok(Json(companies.into_iter().map(CompanyResponse::from_db).collect()))
}

async fn create_company(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CompanyCreate>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let company = repositories::companies::create(
        state.db(),
        repositories::companies::CreateCompany {
            id: &Uuid::new_v4().to_string(),
            name: &payload.name,
            legal_name: payload.legal_name,
            phone: payload.phone,
            email: payload.email,
            address: payload.address,
            national_id: payload.national_id,
            economic_code: payload.economic_code,
            field_of_activity: payload.field_of_activity,
            logo: payload.logo,
            website: payload.website,
            description: payload.description,
            owner_id: &user.id,
            status: CompanyStatus::Active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create company"))?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from_db(company))))
}

async fn get_company(
    Path(company_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = fetch_owned_company(&state, &user, &company_id).await?;
    Ok(Json(CompanyResponse::from_db(company)))
}

async fn update_company(
    Path(company_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CompanyUpdate>,
) -> Result<Json<CompanyResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    fetch_owned_company(&state, &user, &company_id).await?;

    let company = repositories::companies::update(
        state.db(),
        &company_id,
        repositories::companies::UpdateCompany {
            name: payload.name,
            legal_name: payload.legal_name,
            phone: payload.phone,
            email: payload.email,
            address: payload.address,
            national_id: payload.national_id,
            economic_code: payload.economic_code,
            field_of_activity: payload.field_of_activity,
            logo: payload.logo,
            website: payload.website,
            description: payload.description,
            status: payload.status,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update company"))?;

    Ok(Json(CompanyResponse::from_db(company)))
}

async fn delete_company(
    Path(company_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    fetch_owned_company(&state, &user, &company_id).await?;

    repositories::companies::delete(state.db(), &company_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete company"))?;

    Ok(Json(MessageResponse { message: "Company deleted".to_string() }))
}

/// Owners see only their companies; admins see everything.
async fn fetch_owned_company(
    state: &AppState,
    user: &crate::db::models::User,
    company_id: &str,
) -> Result<crate::db::models::Company, ApiError> {
    let company = repositories::companies::find_by_id(state.db(), company_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch company"))?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    if user.role != UserRole::Admin && company.owner_id != user.id {
        return Err(ApiError::Forbidden("Not enough permissions for this company"));
    }

    Ok(company)
}
