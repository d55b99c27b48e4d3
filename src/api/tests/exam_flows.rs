use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support::{self, DbContext};

struct ExamFixture {
    token: String,
    manager_id: String,
    exam_id: String,
    exam_set_id: String,
    question_ids: (String, String),
}

async fn send(
    ctx: &DbContext,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("request");

    let status = response.status();
    let body = test_support::read_json(response).await;
    (status, body)
}

async fn create(
    ctx: &DbContext,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let (status, body) = send(ctx, Method::POST, uri, token, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri}: {body}");
    body
}

/// One owner with a company, a manager, a two-question active exam
/// (passing score 50) and an exam set holding that exam.
async fn seed_exam_fixture(ctx: &DbContext) -> ExamFixture {
    let user =
        test_support::insert_user(ctx.state.db(), &test_support::random_phone(), "Flow Owner", UserRole::Owner)
            .await;
    let token = test_support::bearer_token(ctx.state.db(), &user.id).await;

    let company = create(ctx, "/api/v1/companies", &token, json!({ "name": "Flow Co" })).await;
    let manager = create(
        ctx,
        "/api/v1/managers",
        &token,
        json!({ "user_id": user.id, "company_id": company["id"] }),
    )
    .await;
    let manager_id = manager["id"].as_str().expect("manager id").to_string();

    let q1 = create(
        ctx,
        "/api/v1/questions",
        &token,
        json!({
            "question": "Capital of France?",
            "type": "multiple_choice",
            "options": ["Paris", "Rome"],
            "correct_answer": "Paris",
            "score": 1,
            "category": "geography"
        }),
    )
    .await;
    let q2 = create(
        ctx,
        "/api/v1/questions",
        &token,
        json!({
            "question": "Water boils at 100C at sea level",
            "type": "true_false",
            "correct_answer": "true",
            "score": 2,
            "category": "science"
        }),
    )
    .await;
    let q1_id = q1["id"].as_str().expect("question id").to_string();
    let q2_id = q2["id"].as_str().expect("question id").to_string();

    let exam = create(
        ctx,
        "/api/v1/exams",
        &token,
        json!({
            "title": "Flow Exam",
            "duration_minutes": 30,
            "passing_score": 50,
            "status": "active"
        }),
    )
    .await;
    let exam_id = exam["id"].as_str().expect("exam id").to_string();

    create(
        ctx,
        &format!("/api/v1/exams/{exam_id}/questions"),
        &token,
        json!({ "question_id": q1_id, "order_index": 0 }),
    )
    .await;
    create(
        ctx,
        &format!("/api/v1/exams/{exam_id}/questions"),
        &token,
        json!({ "question_id": q2_id, "order_index": 1 }),
    )
    .await;

    let exam_set = create(
        ctx,
        "/api/v1/exam-sets",
        &token,
        json!({ "manager_id": manager_id, "title": "Flow Set", "exam_ids": [exam_id] }),
    )
    .await;
    let exam_set_id = exam_set["exam_set"]["id"].as_str().expect("exam set id").to_string();

    ExamFixture { token, manager_id, exam_id, exam_set_id, question_ids: (q1_id, q2_id) }
}

#[tokio::test]
async fn duplicate_start_returns_the_existing_attempt() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let fixture = seed_exam_fixture(&ctx).await;

    let start = json!({
        "exam_set_id": fixture.exam_set_id,
        "exam_id": fixture.exam_id,
        "manager_id": fixture.manager_id
    });

    let (status, first) =
        send(&ctx, Method::POST, "/api/v1/exam-results/start", &fixture.token, Some(start.clone()))
            .await;
    assert_eq!(status, StatusCode::CREATED, "response: {first}");
    assert_eq!(first["status"], "in_progress");

    let (status, conflict) =
        send(&ctx, Method::POST, "/api/v1/exam-results/start", &fixture.token, Some(start)).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {conflict}");
    assert_eq!(conflict["status"], 409);
    assert_eq!(conflict["result"]["id"], first["id"]);
}

#[tokio::test]
async fn submit_scores_the_attempt_and_finalizes_it() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let fixture = seed_exam_fixture(&ctx).await;
    let (q1_id, q2_id) = fixture.question_ids.clone();

    let (status, result) = send(
        &ctx,
        Method::POST,
        "/api/v1/exam-results/start",
        &fixture.token,
        Some(json!({
            "exam_set_id": fixture.exam_set_id,
            "exam_id": fixture.exam_id,
            "manager_id": fixture.manager_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {result}");
    let result_id = result["id"].as_str().expect("result id").to_string();

    let (status, body) = send(
        &ctx,
        Method::PUT,
        &format!("/api/v1/exam-results/{result_id}/answers"),
        &fixture.token,
        Some(json!({ "answers": { q1_id.as_str(): "Rome" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");

    // Wrong answer for q1 (1 point), right answer for q2 (2 points):
    // 2 of 3 is 66.67 percent, over the passing score of 50.
    let (status, summary) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/exam-results/{result_id}/submit"),
        &fixture.token,
        Some(json!({ "answers": { q1_id.as_str(): "Rome", q2_id.as_str(): "true" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {summary}");
    assert_eq!(summary["score"], 2);
    assert_eq!(summary["total_score"], 3);
    assert_eq!(summary["percentage"], 66.67);
    assert_eq!(summary["status"], "passed");
    assert_eq!(summary["passed"], true);

    let (status, body) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/exam-results/{result_id}/submit"),
        &fixture.token,
        Some(json!({ "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let (status, body) = send(
        &ctx,
        Method::PUT,
        &format!("/api/v1/exam-results/{result_id}/answers"),
        &fixture.token,
        Some(json!({ "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let (status, report) = send(
        &ctx,
        Method::GET,
        &format!("/api/v1/exam-results/{result_id}/report"),
        &fixture.token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {report}");
    let rows = report["questions"].as_array().expect("report rows");
    assert_eq!(rows.len(), 2);
    let q1_row = rows.iter().find(|row| row["question_id"] == q1_id.as_str()).expect("q1 row");
    assert_eq!(q1_row["correct"], false);
    assert_eq!(q1_row["earned"], 0);
}

#[tokio::test]
async fn assignment_attempts_are_bounded_and_transitions_are_one_way() {
    let Some(ctx) = test_support::setup_db_context().await else {
        eprintln!("AZMOON_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let fixture = seed_exam_fixture(&ctx).await;

    let assign = json!({
        "exam_id": fixture.exam_id,
        "manager_ids": [fixture.manager_id],
        "max_attempts": 1
    });

    let (status, bulk) =
        send(&ctx, Method::POST, "/api/v1/exam-assignments", &fixture.token, Some(assign.clone()))
            .await;
    assert_eq!(status, StatusCode::CREATED, "response: {bulk}");
    let assignment_id =
        bulk["assigned"][0]["id"].as_str().expect("assignment id").to_string();

    // Re-assigning the same pair is skipped, not an error.
    let (status, bulk) =
        send(&ctx, Method::POST, "/api/v1/exam-assignments", &fixture.token, Some(assign)).await;
    assert_eq!(status, StatusCode::CREATED, "response: {bulk}");
    assert_eq!(bulk["assigned"].as_array().expect("assigned").len(), 0);
    assert_eq!(bulk["skipped"][0], fixture.manager_id.as_str());

    let start_uri = format!("/api/v1/exam-assignments/{assignment_id}/start");
    let (status, started) = send(&ctx, Method::POST, &start_uri, &fixture.token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {started}");
    assert_eq!(started["status"], "started");
    assert_eq!(started["attempts"], 1);

    let (status, body) = send(&ctx, Method::POST, &start_uri, &fixture.token, None).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let complete_uri = format!("/api/v1/exam-assignments/{assignment_id}/complete");
    let (status, completed) = send(&ctx, Method::POST, &complete_uri, &fixture.token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {completed}");
    assert_eq!(completed["status"], "completed");

    let (status, body) = send(&ctx, Method::POST, &complete_uri, &fixture.token, None).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    // With the quota spent, an assignable row is refused with Forbidden.
    let (status, body) = send(
        &ctx,
        Method::PATCH,
        &format!("/api/v1/exam-assignments/{assignment_id}"),
        &fixture.token,
        Some(json!({ "status": "assigned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");

    let (status, body) = send(&ctx, Method::POST, &start_uri, &fixture.token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "response: {body}");
}
