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
use crate::db::types::{DifficultyLevel, QuestionType};
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse, QuestionUpdate};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionListQuery {
    #[serde(default, rename = "type")]
    question_type: Option<QuestionType>,
    #[serde(default)]
    difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    category: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/:question_id", get(get_question).patch(update_question).delete(delete_question))
}

async fn list_questions(
    Query(params): Query<QuestionListQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = repositories::questions::list(
        state.db(),
        params.question_type,
        params.difficulty,
        params.category.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from_db).collect()))
}

async fn create_question(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_options(payload.question_type, payload.options.as_deref())?;

    let now = primitive_now_utc();
    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            question: &payload.question,
            question_type: payload.question_type,
            options: payload.options,
            correct_answer: &payload.correct_answer,
            score: payload.score,
            difficulty: payload.difficulty,
            category: &payload.category,
            created_by: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn get_question(
    Path(question_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    Ok(Json(QuestionResponse::from_db(question)))
}

async fn update_question(
    Path(question_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    let Some(existing) = existing else {
        return Err(ApiError::NotFound("Question not found".to_string()));
    };

    let next_type = payload.question_type.unwrap_or(existing.question_type);
    let next_options = payload
        .options
        .as_deref()
        .or(existing.options.as_ref().map(|options| options.0.as_slice()));
    validate_options(next_type, next_options)?;

    let question = repositories::questions::update(
        state.db(),
        &question_id,
        repositories::questions::UpdateQuestion {
            question: payload.question,
            question_type: payload.question_type,
            options: payload.options,
            correct_answer: payload.correct_answer,
            score: payload.score,
            difficulty: payload.difficulty,
            category: payload.category,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    Ok(Json(QuestionResponse::from_db(question)))
}

async fn delete_question(
    Path(question_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::questions::delete(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    if !deleted {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Question deleted".to_string() }))
}

/// Choice questions need at least two options; open questions carry none.
fn validate_options(
    question_type: QuestionType,
    options: Option<&[String]>,
) -> Result<(), ApiError> {
    match question_type {
        QuestionType::MultipleChoice | QuestionType::Checkbox => match options {
            Some(options) if options.len() >= 2 => Ok(()),
            _ => Err(ApiError::BadRequest(
                "Choice questions require at least two options".to_string(),
            )),
        },
        QuestionType::TrueFalse | QuestionType::Rating | QuestionType::Descriptive => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_options;
    use crate::db::types::QuestionType;

    #[test]
    fn choice_questions_require_two_options() {
        let one = vec!["a".to_string()];
        let two = vec!["a".to_string(), "b".to_string()];

        assert!(validate_options(QuestionType::MultipleChoice, None).is_err());
        assert!(validate_options(QuestionType::MultipleChoice, Some(&one)).is_err());
        assert!(validate_options(QuestionType::MultipleChoice, Some(&two)).is_ok());
        assert!(validate_options(QuestionType::Checkbox, Some(&two)).is_ok());
    }

    #[test]
    fn open_questions_need_no_options() {
        assert!(validate_options(QuestionType::Descriptive, None).is_ok());
        assert!(validate_options(QuestionType::TrueFalse, None).is_ok());
        assert!(validate_options(QuestionType::Rating, None).is_ok());
    }
}
