use rand::Rng;
use sqlx::PgPool;
use time::{Duration, PrimitiveDateTime};

use crate::core::config::Settings;
use crate::core::time::primitive_now_utc;
use crate::repositories::otp_codes::{self, CreateOtpCode};

/// Four digits, zero padded. Codes are scoped to a phone number and may
/// repeat across phones.
pub(crate) fn generate_code() -> String {
    let value: u16 = rand::thread_rng().gen_range(0..=9999);
    format!("{value:04}")
}

pub(crate) struct IssuedOtp {
    pub(crate) code: String,
    pub(crate) expires_at: PrimitiveDateTime,
}

pub(crate) enum IssueOutcome {
    Issued(IssuedOtp),
    RateLimited,
}

/// Enforces the sliding window, clears the phone's expired codes and
/// persists a fresh one. The window counts every code created in it, expired
/// or not, so the count must run before the cleanup.
pub(crate) async fn issue(
    pool: &PgPool,
    settings: &Settings,
    phone: &str,
) -> Result<IssueOutcome, sqlx::Error> {
    let now = primitive_now_utc();

    let window_start = now - Duration::minutes(settings.otp().rate_limit_window_minutes as i64);
    let issued = otp_codes::count_issued_since(pool, phone, window_start).await?;
    if issued >= settings.otp().rate_limit_max as i64 {
        return Ok(IssueOutcome::RateLimited);
    }

    otp_codes::delete_expired_for_phone(pool, phone, now).await?;

    let code = generate_code();
    let expires_at = now + Duration::minutes(settings.otp().expire_minutes as i64);
    let id = uuid::Uuid::new_v4().to_string();
    otp_codes::create(
        pool,
        CreateOtpCode { id: &id, phone, code: &code, expires_at, created_at: now },
    )
    .await?;

    Ok(IssueOutcome::Issued(IssuedOtp { code, expires_at }))
}

/// Claims the newest live code in one statement; false covers wrong code,
/// expiry and replay alike.
pub(crate) async fn verify(pool: &PgPool, phone: &str, code: &str) -> Result<bool, sqlx::Error> {
    otp_codes::claim(pool, phone, code, primitive_now_utc()).await
}

#[cfg(test)]
mod tests {
    use super::generate_code;

    #[test]
    fn codes_are_four_zero_padded_digits() {
        for _ in 0..256 {
            let code = generate_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
