use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Manager;
use crate::db::types::{ManagerStatus, ProgressStatus};

const COLUMNS: &str = "\
    id, user_id, company_id, position, department, status, assessment_status, \
    exam_status, can_view_results, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    company_id: Option<&str>,
    status: Option<ManagerStatus>,
) -> Result<Vec<Manager>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM managers WHERE TRUE"));

    if let Some(company_id) = company_id {
        builder.push(" AND company_id = ");
        builder.push_bind(company_id);
    }

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<Manager>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Manager>, sqlx::Error> {
    sqlx::query_as::<_, Manager>(&format!("SELECT {COLUMNS} FROM managers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateManager<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) position: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) status: ManagerStatus,
    pub(crate) can_view_results: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateManager<'_>,
) -> Result<Manager, sqlx::Error> {
    sqlx::query_as::<_, Manager>(&format!(
        "INSERT INTO managers (
            id, user_id, company_id, position, department, status,
            assessment_status, exam_status, can_view_results, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.company_id)
    .bind(params.position)
    .bind(params.department)
    .bind(params.status)
    .bind(ProgressStatus::NotStarted)
    .bind(ProgressStatus::NotStarted)
    .bind(params.can_view_results)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateManager {
    pub(crate) position: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) status: Option<ManagerStatus>,
    pub(crate) assessment_status: Option<ProgressStatus>,
    pub(crate) exam_status: Option<ProgressStatus>,
    pub(crate) can_view_results: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateManager,
) -> Result<Manager, sqlx::Error> {
    sqlx::query_as::<_, Manager>(&format!(
        "UPDATE managers SET
            position = COALESCE($1, position),
            department = COALESCE($2, department),
            status = COALESCE($3, status),
            assessment_status = COALESCE($4, assessment_status),
            exam_status = COALESCE($5, exam_status),
            can_view_results = COALESCE($6, can_view_results),
            updated_at = $7
         WHERE id = $8
         RETURNING {COLUMNS}"
    ))
    .bind(params.position)
    .bind(params.department)
    .bind(params.status)
    .bind(params.assessment_status)
    .bind(params.exam_status)
    .bind(params.can_view_results)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM managers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
