use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionType};

const COLUMNS: &str = "\
    id, question, type, options, correct_answer, score, difficulty, category, \
    created_by, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    question_type: Option<QuestionType>,
    difficulty: Option<DifficultyLevel>,
    category: Option<&str>,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM questions WHERE TRUE"));

    if let Some(question_type) = question_type {
        builder.push(" AND type = ");
        builder.push_bind(question_type);
    }

    if let Some(difficulty) = difficulty {
        builder.push(" AND difficulty = ");
        builder.push_bind(difficulty);
    }

    if let Some(category) = category {
        builder.push(" AND category = ");
        builder.push_bind(category);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) question: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: &'a str,
    pub(crate) score: i32,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) category: &'a str,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, question, type, options, correct_answer, score, difficulty,
            category, created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.question)
    .bind(params.question_type)
    .bind(params.options.map(Json))
    .bind(params.correct_answer)
    .bind(params.score)
    .bind(params.difficulty)
    .bind(params.category)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestion {
    pub(crate) question: Option<String>,
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) score: Option<i32>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) category: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateQuestion,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            question = COALESCE($1, question),
            type = COALESCE($2, type),
            options = COALESCE($3, options),
            correct_answer = COALESCE($4, correct_answer),
            score = COALESCE($5, score),
            difficulty = COALESCE($6, difficulty),
            category = COALESCE($7, category),
            updated_at = $8
         WHERE id = $9
         RETURNING {COLUMNS}"
    ))
    .bind(params.question)
    .bind(params.question_type)
    .bind(params.options.map(Json))
    .bind(params.correct_answer)
    .bind(params.score)
    .bind(params.difficulty)
    .bind(params.category)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
