use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::OtpCode;

const COLUMNS: &str = "id, phone, code, expires_at, verified_at, created_at";

pub(crate) struct CreateOtpCode<'a> {
    pub(crate) id: &'a str,
    pub(crate) phone: &'a str,
    pub(crate) code: &'a str,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateOtpCode<'_>,
) -> Result<OtpCode, sqlx::Error> {
    sqlx::query_as::<_, OtpCode>(&format!(
        "INSERT INTO otp_codes (id, phone, code, expires_at, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.phone)
    .bind(params.code)
    .bind(params.expires_at)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Housekeeping on issuance: drop this phone's already expired codes.
pub(crate) async fn delete_expired_for_phone(
    pool: &PgPool,
    phone: &str,
    now: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM otp_codes WHERE phone = $1 AND expires_at < $2")
        .bind(phone)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn count_issued_since(
    pool: &PgPool,
    phone: &str,
    window_start: PrimitiveDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM otp_codes WHERE phone = $1 AND created_at > $2")
        .bind(phone)
        .bind(window_start)
        .fetch_one(pool)
        .await
}

/// Single-use claim: marks the matching unverified, unexpired row verified in
/// one statement so two concurrent verifies cannot both succeed.
pub(crate) async fn claim(
    pool: &PgPool,
    phone: &str,
    code: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE otp_codes SET verified_at = $3
         WHERE id = (
             SELECT id FROM otp_codes
             WHERE phone = $1 AND code = $2 AND verified_at IS NULL AND expires_at > $3
             ORDER BY created_at DESC
             LIMIT 1
         )",
    )
    .bind(phone)
    .bind(code)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
