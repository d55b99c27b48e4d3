use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::{ExamSet, ExamSetItem};
use crate::db::types::{ExamSetStatus, ProgressStatus};

const COLUMNS: &str = "\
    id, manager_id, title, description, assigned_date, exam_date, due_date, status, \
    username, password_hash, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, exam_set_id, exam_id, order_index, status, created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    manager_id: Option<&str>,
    status: Option<ExamSetStatus>,
) -> Result<Vec<ExamSet>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exam_sets WHERE TRUE"));

    if let Some(manager_id) = manager_id {
        builder.push(" AND manager_id = ");
        builder.push_bind(manager_id);
    }

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.build_query_as::<ExamSet>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ExamSet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSet>(&format!("SELECT {COLUMNS} FROM exam_sets WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<ExamSet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSet>(&format!("SELECT {COLUMNS} FROM exam_sets WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateExamSet<'a> {
    pub(crate) id: &'a str,
    pub(crate) manager_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<String>,
    pub(crate) assigned_date: Date,
    pub(crate) exam_date: Option<Date>,
    pub(crate) due_date: Option<Date>,
    pub(crate) status: ExamSetStatus,
    pub(crate) username: &'a str,
    pub(crate) password_hash: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateExamSet<'_>,
) -> Result<ExamSet, sqlx::Error> {
    sqlx::query_as::<_, ExamSet>(&format!(
        "INSERT INTO exam_sets (
            id, manager_id, title, description, assigned_date, exam_date, due_date,
            status, username, password_hash, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.manager_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.assigned_date)
    .bind(params.exam_date)
    .bind(params.due_date)
    .bind(params.status)
    .bind(params.username)
    .bind(params.password_hash)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExamSet {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) exam_date: Option<Date>,
    pub(crate) due_date: Option<Date>,
    pub(crate) status: Option<ExamSetStatus>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExamSet,
) -> Result<ExamSet, sqlx::Error> {
    sqlx::query_as::<_, ExamSet>(&format!(
        "UPDATE exam_sets SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            exam_date = COALESCE($3, exam_date),
            due_date = COALESCE($4, due_date),
            status = COALESCE($5, status),
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.exam_date)
    .bind(params.due_date)
    .bind(params.status)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_sets WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) struct CreateExamSetItem<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_set_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create_item(
    pool: &PgPool,
    params: CreateExamSetItem<'_>,
) -> Result<ExamSetItem, sqlx::Error> {
    sqlx::query_as::<_, ExamSetItem>(&format!(
        "INSERT INTO exam_set_items (
            id, exam_set_id, exam_id, order_index, status, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {ITEM_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.exam_set_id)
    .bind(params.exam_id)
    .bind(params.order_index)
    .bind(ProgressStatus::NotStarted)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn items_for_set(
    pool: &PgPool,
    exam_set_id: &str,
) -> Result<Vec<ExamSetItem>, sqlx::Error> {
    sqlx::query_as::<_, ExamSetItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM exam_set_items WHERE exam_set_id = $1 ORDER BY order_index"
    ))
    .bind(exam_set_id)
    .fetch_all(pool)
    .await
}
