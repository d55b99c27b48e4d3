use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::test_support::{self, DbContext, MultipartFile};

async fn request_code(ctx: &DbContext, phone: &str) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/send-otp",
            None,
            Some(json!({ "phone": phone })),
        ))
        .await
        .expect("send otp");

    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

async fn issue_code(ctx: &DbContext, phone: &str) -> String {
    let (status, body) = request_code(ctx, phone).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    body["code"].as_str().expect("code echoed outside production").to_string()
}

#[tokio::test]
async fn issued_code_verifies_once_and_logs_the_user_in() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };

    let phone = test_support::random_phone();
    let (status, body) = request_code(&ctx, &phone).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["is_registered"], false);
    let code = body["code"].as_str().expect("code echoed outside production").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({ "phone": phone, "code": code })),
        ))
        .await
        .expect("verify otp");

    let status = response.status();
    let login = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {login}");
    let token = login["access_token"].as_str().expect("access token");
    assert_eq!(login["user"]["phone"], phone.as_str());
    assert_eq!(login["user"]["name"], format!("User {}", &phone[7..]));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(token), None))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);

    // A claimed code cannot be replayed.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({ "phone": phone, "code": code })),
        ))
        .await
        .expect("verify again");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fourth_code_in_the_window_is_rate_limited_even_after_codes_expire() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };

    let phone = test_support::random_phone();
    for _ in 0..3 {
        issue_code(&ctx, &phone).await;
    }

    let (status, _) = request_code(&ctx, &phone).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Age the codes past their validity while keeping them inside the
    // sliding window; expiry must not open the quota back up.
    let now = primitive_now_utc();
    sqlx::query("UPDATE otp_codes SET created_at = $1, expires_at = $2 WHERE phone = $3")
        .bind(now - Duration::minutes(10))
        .bind(now - Duration::minutes(5))
        .bind(&phone)
        .execute(ctx.state.db())
        .await
        .expect("backdate codes");

    let (status, body) = request_code(&ctx, &phone).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS, "response: {body}");
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };

    let phone = test_support::random_phone();
    let code = issue_code(&ctx, &phone).await;

    sqlx::query("UPDATE otp_codes SET expires_at = $1 WHERE phone = $2")
        .bind(primitive_now_utc() - Duration::minutes(1))
        .bind(&phone)
        .execute(ctx.state.db())
        .await
        .expect("expire code");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/verify-otp",
            None,
            Some(json!({ "phone": phone, "code": code })),
        ))
        .await
        .expect("verify expired");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_stores_the_submitted_avatar_only_once() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };

    let phone = test_support::random_phone();
    let code = issue_code(&ctx, &phone).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/v1/auth/verify-otp",
            None,
            &[("phone", &phone), ("code", &code), ("name", "Avatar User")],
            Some(MultipartFile {
                name: "avatar",
                filename: "avatar.png",
                content_type: "image/png",
                bytes: b"png-bytes",
            }),
        ))
        .await
        .expect("verify with avatar");

    let status = response.status();
    let login = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {login}");
    assert_eq!(login["user"]["name"], "Avatar User");
    let avatar = login["user"]["avatar"].as_str().expect("stored avatar path").to_string();
    assert!(avatar.ends_with(".png"), "avatar path: {avatar}");

    // Logging into the existing account again must not replace the avatar.
    let code = issue_code(&ctx, &phone).await;
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/v1/auth/verify-otp",
            None,
            &[("phone", &phone), ("code", &code)],
            Some(MultipartFile {
                name: "avatar",
                filename: "other.png",
                content_type: "image/png",
                bytes: b"other-bytes",
            }),
        ))
        .await
        .expect("second login");

    let status = response.status();
    let login = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {login}");
    assert_eq!(login["user"]["avatar"], avatar.as_str());
}
