use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::ExamResult;
use crate::db::types::ResultStatus;

const COLUMNS: &str = "\
    id, exam_set_id, exam_id, manager_id, answers, score, total_score, percentage, \
    status, started_at, completed_at, time_spent, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    exam_set_id: Option<&str>,
    manager_id: Option<&str>,
    status: Option<ResultStatus>,
) -> Result<Vec<ExamResult>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exam_results WHERE TRUE"));

    if let Some(exam_set_id) = exam_set_id {
        builder.push(" AND exam_set_id = ");
        builder.push_bind(exam_set_id);
    }

    if let Some(manager_id) = manager_id {
        builder.push(" AND manager_id = ");
        builder.push_bind(manager_id);
    }

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<ExamResult>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!("SELECT {COLUMNS} FROM exam_results WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<ExamResult, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!("SELECT {COLUMNS} FROM exam_results WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn find_by_triple(
    pool: &PgPool,
    exam_set_id: &str,
    exam_id: &str,
    manager_id: &str,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {COLUMNS} FROM exam_results
         WHERE exam_set_id = $1 AND exam_id = $2 AND manager_id = $3"
    ))
    .bind(exam_set_id)
    .bind(exam_id)
    .bind(manager_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateResult<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_set_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) manager_id: &'a str,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// The unique (exam_set_id, exam_id, manager_id) index makes this the only
/// winner of a concurrent start race; losers get false and refetch.
pub(crate) async fn create(pool: &PgPool, params: CreateResult<'_>) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_results (
            id, exam_set_id, exam_id, manager_id, answers, score, total_score,
            percentage, status, started_at, time_spent, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,'{}',0,0,0,$5,$6,0,$7,$8)
        ON CONFLICT (exam_set_id, exam_id, manager_id) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.exam_set_id)
    .bind(params.exam_id)
    .bind(params.manager_id)
    .bind(ResultStatus::InProgress)
    .bind(params.started_at)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Draft save; false means the attempt is no longer in progress.
pub(crate) async fn save_answers(
    pool: &PgPool,
    id: &str,
    answers: &HashMap<String, serde_json::Value>,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_results SET answers = $1, updated_at = $2
         WHERE id = $3 AND status = $4",
    )
    .bind(Json(answers))
    .bind(now)
    .bind(id)
    .bind(ResultStatus::InProgress)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) struct FinalizeResult<'a> {
    pub(crate) answers: &'a HashMap<String, serde_json::Value>,
    pub(crate) score: i32,
    pub(crate) total_score: i32,
    pub(crate) percentage: f64,
    pub(crate) status: ResultStatus,
    pub(crate) completed_at: PrimitiveDateTime,
    pub(crate) time_spent: i32,
}

/// Grades land only on an in-progress row; a second submit affects nothing
/// and the caller reports the conflict.
pub(crate) async fn finalize(
    pool: &PgPool,
    id: &str,
    params: FinalizeResult<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_results SET
            answers = $1, score = $2, total_score = $3, percentage = $4,
            status = $5, completed_at = $6, time_spent = $7, updated_at = $6
         WHERE id = $8 AND status = $9",
    )
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(params.total_score)
    .bind(params.percentage)
    .bind(params.status)
    .bind(params.completed_at)
    .bind(params.time_spent)
    .bind(id)
    .bind(ResultStatus::InProgress)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM exam_results WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
