use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{Exam, Question};
use crate::db::types::ExamStatus;

const COLUMNS: &str = "\
    id, title, description, duration_minutes, passing_score, status, created_by, \
    created_at, updated_at";

const QUESTION_COLUMNS: &str = "\
    q.id, q.question, q.type, q.options, q.correct_answer, q.score, q.difficulty, \
    q.category, q.created_by, q.created_at, q.updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    status: Option<ExamStatus>,
) -> Result<Vec<Exam>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exams WHERE TRUE"));

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<Exam>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) status: ExamStatus,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, title, description, duration_minutes, passing_score, status,
            created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.duration_minutes)
    .bind(params.passing_score)
    .bind(params.status)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) passing_score: Option<i32>,
    pub(crate) status: Option<ExamStatus>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExam,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            duration_minutes = COALESCE($3, duration_minutes),
            passing_score = COALESCE($4, passing_score),
            status = COALESCE($5, status),
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.duration_minutes)
    .bind(params.passing_score)
    .bind(params.status)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Questions of an exam in their per-exam order; this is the answer key the
/// scoring engine consumes.
pub(crate) async fn questions_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions q
         JOIN exam_questions eq ON eq.question_id = q.id
         WHERE eq.exam_id = $1
         ORDER BY eq.order_index"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

/// Attach keeps existing links untouched (Laravel's syncWithoutDetaching).
pub(crate) async fn attach_question(
    pool: &PgPool,
    exam_id: &str,
    question_id: &str,
    order_index: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_questions (exam_id, question_id, order_index)
         VALUES ($1, $2, $3)
         ON CONFLICT (exam_id, question_id) DO NOTHING",
    )
    .bind(exam_id)
    .bind(question_id)
    .bind(order_index)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn detach_question(
    pool: &PgPool,
    exam_id: &str,
    question_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_questions WHERE exam_id = $1 AND question_id = $2")
        .bind(exam_id)
        .bind(question_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
