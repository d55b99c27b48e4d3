use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::AccessToken;

const COLUMNS: &str = "id, user_id, token_hash, created_at, last_used_at";

pub(crate) struct CreateToken<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) token_hash: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateToken<'_>,
) -> Result<AccessToken, sqlx::Error> {
    sqlx::query_as::<_, AccessToken>(&format!(
        "INSERT INTO access_tokens (id, user_id, token_hash, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.token_hash)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<AccessToken>, sqlx::Error> {
    sqlx::query_as::<_, AccessToken>(&format!(
        "SELECT {COLUMNS} FROM access_tokens WHERE token_hash = $1"
    ))
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn touch_last_used(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE access_tokens SET last_used_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revokes exactly one session; other tokens for the same user stay valid.
pub(crate) async fn delete_by_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM access_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
