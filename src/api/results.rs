use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{minutes_between, primitive_now_utc};
use crate::db::models::ExamResult;
use crate::db::types::ResultStatus;
use crate::repositories;
use crate::schemas::result::{
    ReportRow, ResultConflictResponse, ResultReportResponse, ResultResponse, ResultStart,
    ResultSummaryResponse, SaveAnswersRequest, SubmitRequest,
};
use crate::schemas::MessageResponse;
use crate::services::scoring;

#[derive(Debug, Deserialize)]
pub(crate) struct ResultListQuery {
    #[serde(default)]
    #[serde(alias = "examSetId")]
    exam_set_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "managerId")]
    manager_id: Option<String>,
    #[serde(default)]
    status: Option<ResultStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_results))
        .route("/start", post(start_result))
        .route("/:result_id", get(get_result).delete(delete_result))
        .route("/:result_id/answers", put(save_answers))
        .route("/:result_id/submit", post(submit_result))
        .route("/:result_id/report", get(result_report))
}

async fn list_results(
    Query(params): Query<ResultListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    let results = repositories::results::list(
        state.db(),
        params.exam_set_id.as_deref(),
        params.manager_id.as_deref(),
        params.status,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list exam results"))?;

    Ok(Json(results.into_iter().map(ResultResponse::from_db).collect()))
}

/// Opens an attempt. If one already exists for the (set, exam, manager)
/// triple the conflict response carries the existing row.
async fn start_result(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ResultStart>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam_set = repositories::exam_sets::find_by_id(state.db(), &payload.exam_set_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam set"))?;
    if exam_set.is_none() {
        return Err(ApiError::NotFound("Exam set not found".to_string()));
    }

    let exam = repositories::exams::find_by_id(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;
    if exam.is_none() {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let manager = repositories::managers::find_by_id(state.db(), &payload.manager_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch manager"))?;
    if manager.is_none() {
        return Err(ApiError::NotFound("Manager not found".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let now = primitive_now_utc();
    let created = repositories::results::create(
        state.db(),
        repositories::results::CreateResult {
            id: &id,
            exam_set_id: &payload.exam_set_id,
            exam_id: &payload.exam_id,
            manager_id: &payload.manager_id,
            started_at: now,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam result"))?;

    if !created {
        let detail = "An attempt already exists for this exam in this set".to_string();
        let existing = repositories::results::find_by_triple(
            state.db(),
            &payload.exam_set_id,
            &payload.exam_id,
            &payload.manager_id,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch existing result"))?
        .ok_or(ApiError::Conflict(detail.clone()))?;

        let body = ResultConflictResponse {
            status: StatusCode::CONFLICT.as_u16(),
            detail,
            result: ResultResponse::from_db(existing),
        };
        return Ok((StatusCode::CONFLICT, Json(body)).into_response());
    }

    let result = repositories::results::fetch_one_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch created result"))?;

    Ok((StatusCode::CREATED, Json(ResultResponse::from_db(result))).into_response())
}

async fn get_result(
    Path(result_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ResultResponse>, ApiError> {
    let result = fetch_result(&state, &result_id).await?;
    Ok(Json(ResultResponse::from_db(result)))
}

/// Draft autosave; answers replace the stored map wholesale.
async fn save_answers(
    Path(result_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SaveAnswersRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    fetch_result(&state, &result_id).await?;

    let saved = repositories::results::save_answers(
        state.db(),
        &result_id,
        &payload.answers,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answers"))?;

    if !saved {
        return Err(ApiError::Conflict("Attempt is no longer in progress".to_string()));
    }

    Ok(Json(MessageResponse { message: "Answers saved".to_string() }))
}

async fn submit_result(
    Path(result_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ResultSummaryResponse>, ApiError> {
    let result = fetch_result(&state, &result_id).await?;

    if result.status != ResultStatus::InProgress {
        return Err(ApiError::Conflict("Attempt has already been submitted".to_string()));
    }

    let exam = repositories::exams::find_by_id(state.db(), &result.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let questions = repositories::exams::questions_for_exam(state.db(), &result.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    let outcome = scoring::score_answers(&questions, &payload.answers, exam.passing_score);

    let now = primitive_now_utc();
    let time_spent = result.started_at.map(|started| minutes_between(started, now)).unwrap_or(0);

    let finalized = repositories::results::finalize(
        state.db(),
        &result_id,
        repositories::results::FinalizeResult {
            answers: &payload.answers,
            score: outcome.score,
            total_score: outcome.total_score,
            percentage: outcome.percentage,
            status: outcome.status,
            completed_at: now,
            time_spent,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to finalize exam result"))?;

    if !finalized {
        return Err(ApiError::Conflict("Attempt has already been submitted".to_string()));
    }

    let result = repositories::results::fetch_one_by_id(state.db(), &result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch finalized result"))?;

    Ok(Json(ResultSummaryResponse::from_db(result)))
}

/// Per question breakdown for a graded attempt.
async fn result_report(
    Path(result_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ResultReportResponse>, ApiError> {
    let result = fetch_result(&state, &result_id).await?;

    if result.status == ResultStatus::InProgress {
        return Err(ApiError::BadRequest("Attempt has not been submitted yet".to_string()));
    }

    let questions = repositories::exams::questions_for_exam(state.db(), &result.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    let mut rows = Vec::with_capacity(questions.len());
    for question in questions {
        let given_answer = result.answers.0.get(&question.id).cloned();
        let correct = given_answer
            .as_ref()
            .map(|given| {
                scoring::answer_matches(question.question_type, &question.correct_answer, given)
            })
            .unwrap_or(false);

        rows.push(ReportRow {
            earned: if correct { question.score } else { 0 },
            question_id: question.id,
            question: question.question,
            question_type: question.question_type,
            correct_answer: question.correct_answer,
            given_answer,
            score: question.score,
            correct,
        });
    }

    Ok(Json(ResultReportResponse { result: ResultResponse::from_db(result), questions: rows }))
}

async fn delete_result(
    Path(result_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::results::delete(state.db(), &result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam result"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam result not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Exam result deleted".to_string() }))
}

async fn fetch_result(state: &AppState, result_id: &str) -> Result<ExamResult, ApiError> {
    repositories::results::find_by_id(state.db(), result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam result"))?
        .ok_or_else(|| ApiError::NotFound("Exam result not found".to_string()))
}
