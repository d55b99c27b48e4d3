use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::ExamStatus;
use crate::repositories;
use crate::schemas::exam::{
    AttachQuestionRequest, ExamCreate, ExamResponse, ExamSummaryResponse, ExamUpdate,
};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct ExamListQuery {
    #[serde(default)]
    status: Option<ExamStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/:exam_id", get(get_exam).patch(update_exam).delete(delete_exam))
        .route("/:exam_id/questions", axum::routing::post(attach_question))
        .route("/:exam_id/questions/:question_id", delete(detach_question))
}

async fn list_exams(
    Query(params): Query<ExamListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamSummaryResponse>>, ApiError> {
    let exams = repositories::exams::list(state.db(), params.status)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(exams.into_iter().map(ExamSummaryResponse::from_db).collect()))
}

async fn create_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            description: payload.description,
            duration_minutes: payload.duration_minutes,
            passing_score: payload.passing_score,
            status: payload.status,
            created_by: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam, Vec::new()))))
}

async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let questions = repositories::exams::questions_for_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    Ok(Json(ExamResponse::from_db(exam, questions)))
}

async fn update_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let exam = repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            title: payload.title,
            description: payload.description,
            duration_minutes: payload.duration_minutes,
            passing_score: payload.passing_score,
            status: payload.status,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    let questions = repositories::exams::questions_for_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    Ok(Json(ExamResponse::from_db(exam, questions)))
}

async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::exams::delete(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Exam deleted".to_string() }))
}

async fn attach_question(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AttachQuestionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
    if exam.is_none() {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let question = repositories::questions::find_by_id(state.db(), &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    if question.is_none() {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    let attached = repositories::exams::attach_question(
        state.db(),
        &exam_id,
        &payload.question_id,
        payload.order_index,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to attach question"))?;

    if !attached {
        return Err(ApiError::Conflict("Question is already attached to this exam".to_string()));
    }

    Ok((StatusCode::CREATED, Json(MessageResponse { message: "Question attached".to_string() })))
}

async fn detach_question(
    Path((exam_id, question_id)): Path<(String, String)>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let detached = repositories::exams::detach_question(state.db(), &exam_id, &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to detach question"))?;

    if !detached {
        return Err(ApiError::NotFound("Question is not attached to this exam".to_string()));
    }

    Ok(Json(MessageResponse { message: "Question detached".to_string() }))
}
