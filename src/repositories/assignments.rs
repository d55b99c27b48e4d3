use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::ExamAssignment;
use crate::db::types::AssignmentStatus;

const COLUMNS: &str = "\
    id, exam_id, manager_id, assigned_date, due_date, status, \
    attempts, max_attempts, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    exam_id: Option<&str>,
    manager_id: Option<&str>,
    status: Option<AssignmentStatus>,
) -> Result<Vec<ExamAssignment>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exam_assignments WHERE TRUE"));

    if let Some(exam_id) = exam_id {
        builder.push(" AND exam_id = ");
        builder.push_bind(exam_id);
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
    builder.build_query_as::<ExamAssignment>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ExamAssignment>, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "SELECT {COLUMNS} FROM exam_assignments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn fetch_one_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<ExamAssignment, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "SELECT {COLUMNS} FROM exam_assignments WHERE id = $1"
    ))
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) manager_id: &'a str,
    pub(crate) assigned_date: Date,
    pub(crate) due_date: Option<Date>,
    pub(crate) max_attempts: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Returns false when the exam is already assigned to the manager; bulk
/// assignment skips those pairs instead of failing.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_assignments (
            id, exam_id, manager_id, assigned_date, due_date,
            status, attempts, max_attempts, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,0,$7,$8,$9)
        ON CONFLICT (exam_id, manager_id) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.manager_id)
    .bind(params.assigned_date)
    .bind(params.due_date)
    .bind(AssignmentStatus::Assigned)
    .bind(params.max_attempts)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) struct UpdateAssignment {
    pub(crate) due_date: Option<Date>,
    pub(crate) status: Option<AssignmentStatus>,
    pub(crate) max_attempts: Option<i32>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateAssignment,
) -> Result<ExamAssignment, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "UPDATE exam_assignments SET
            due_date = COALESCE($1, due_date),
            status = COALESCE($2, status),
            max_attempts = COALESCE($3, max_attempts),
            updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(params.due_date)
    .bind(params.status)
    .bind(params.max_attempts)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM exam_assignments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Claims an attempt in one statement. The WHERE clause carries both
/// preconditions, so two racing starts can never double-count an attempt.
pub(crate) async fn start_transition(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_assignments
         SET status = $1, attempts = attempts + 1, updated_at = $2
         WHERE id = $3 AND status = $4 AND attempts < max_attempts",
    )
    .bind(AssignmentStatus::Started)
    .bind(now)
    .bind(id)
    .bind(AssignmentStatus::Assigned)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn complete_transition(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_assignments
         SET status = $1, updated_at = $2
         WHERE id = $3 AND status <> $1",
    )
    .bind(AssignmentStatus::Completed)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
