//! HTTP-level tests for deliverables: creation, submission and review.

mod common;

use axum::http::StatusCode;
use common::{add_member, body_json, create_project, get_auth, post_json_auth, user_with_token};
use gestion_core::membership::ProjectRole;
use gestion_core::roles::Role;
use gestion_core::types::DbId;
use gestion_db::models::project::Project;
use serde_json::{json, Value};
use sqlx::PgPool;

/// A project with an active student member and an active director member.
struct Fixture {
    project: Project,
    student_id: DbId,
    student_token: String,
    director_token: String,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let project = create_project(pool, "Tesis", None).await;
    let (student, student_token) = user_with_token(pool, "ana", Role::Student, None).await;
    let (director, director_token) = user_with_token(pool, "luis", Role::Director, None).await;
    add_member(pool, project.id, student.id, ProjectRole::Student).await;
    add_member(pool, project.id, director.id, ProjectRole::Director).await;
    Fixture {
        project,
        student_id: student.id,
        student_token,
        director_token,
    }
}

async fn create_deliverable(pool: &PgPool, f: &Fixture, body: Value) -> Value {
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/projects/{}/deliverables", f.project.id);
    let response = post_json_auth(app, &uri, body, &f.director_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn post(pool: &PgPool, uri: &str, body: Value, token: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, uri, body, token).await
}

// ---------------------------------------------------------------------------
// Creation and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deliverable_starts_pending_and_is_listed(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(
        &pool,
        &f,
        json!({ "title": "Capítulo 1", "phase": "Propuesta", "assignee_id": f.student_id, "due_date": "2026-11-30" }),
    )
    .await;
    assert_eq!(created["status_id"], 1);
    assert_eq!(created["assignee_id"], f.student_id);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/projects/{}/deliverables", f.project.id);
    let json = body_json(get_auth(app, &uri, &f.student_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Capítulo 1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignee_must_take_part_in_the_project(pool: PgPool) {
    let f = fixture(&pool).await;
    let (outsider, _) = user_with_token(&pool, "ben", Role::Student, None).await;

    let uri = format!("/api/v1/projects/{}/deliverables", f.project.id);
    let response = post(
        &pool,
        &uri,
        json!({ "title": "Capítulo 1", "assignee_id": outsider.id }),
        &f.director_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluator_cannot_be_assigned_a_deliverable(pool: PgPool) {
    let f = fixture(&pool).await;
    let (evaluator, evaluator_token) = user_with_token(&pool, "eva", Role::Evaluator, None).await;
    add_member(&pool, f.project.id, evaluator.id, ProjectRole::Evaluator).await;

    let uri = format!("/api/v1/projects/{}/deliverables", f.project.id);
    let response = post(
        &pool,
        &uri,
        json!({ "title": "Capítulo 1", "assignee_id": evaluator.id }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &uri, &evaluator_token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Review cycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_review_cycle_is_recorded_in_history(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(&pool, &f, json!({ "title": "Capítulo 1" })).await;
    let base = format!("/api/v1/deliverables/{}", created["id"]);

    let response = post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &f.student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["submitted_file"], "uploads/cap1.pdf");
    assert!(json["data"]["submitted_at"].is_string());

    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "request_changes", "feedback": "Falta el marco teórico" }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["feedback"], "Falta el marco teórico");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &format!("{base}/history"), &f.student_token).await).await;
    let steps: Vec<(i64, i64)> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["from_status_id"].as_i64().unwrap(),
                e["to_status_id"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(steps, vec![(1, 2), (2, 3), (3, 6)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejection_without_feedback_is_refused(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(&pool, &f, json!({ "title": "Capítulo 1" })).await;
    let base = format!("/api/v1/deliverables/{}", created["id"]);
    post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &f.student_token,
    )
    .await;
    post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &f.director_token,
    )
    .await;

    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "reject", "feedback": "   " }),
        &f.director_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn accepting_an_unsubmitted_deliverable_is_invalid(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(&pool, &f, json!({ "title": "Capítulo 1" })).await;

    let response = post(
        &pool,
        &format!("/api/v1/deliverables/{}/review", created["id"]),
        json!({ "verdict": "accept" }),
        &f.director_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_cannot_review_even_their_own_deliverable(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(
        &pool,
        &f,
        json!({ "title": "Capítulo 1", "assignee_id": f.student_id }),
    )
    .await;

    let response = post(
        &pool,
        &format!("/api/v1/deliverables/{}/review", created["id"]),
        json!({ "verdict": "start_review" }),
        &f.student_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluator_member_reviews_but_cannot_submit(pool: PgPool) {
    let f = fixture(&pool).await;
    let (evaluator, evaluator_token) = user_with_token(&pool, "eva", Role::Evaluator, None).await;
    add_member(&pool, f.project.id, evaluator.id, ProjectRole::Evaluator).await;
    let created = create_deliverable(&pool, &f, json!({ "title": "Capítulo 1" })).await;
    let base = format!("/api/v1/deliverables/{}", created["id"]);

    let response = post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &evaluator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &f.student_token,
    )
    .await;
    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &evaluator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reviewer_cannot_review_own_submission(pool: PgPool) {
    let f = fixture(&pool).await;
    let created = create_deliverable(&pool, &f, json!({ "title": "Capítulo 1" })).await;
    let base = format!("/api/v1/deliverables/{}", created["id"]);

    let response = post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignee_cannot_review_own_deliverable(pool: PgPool) {
    let f = fixture(&pool).await;
    let (coordinator, coordinator_token) =
        user_with_token(&pool, "rosa", Role::Coordinator, None).await;
    add_member(&pool, f.project.id, coordinator.id, ProjectRole::Coordinator).await;
    let created = create_deliverable(
        &pool,
        &f,
        json!({ "title": "Capítulo 1", "assignee_id": coordinator.id }),
    )
    .await;
    let base = format!("/api/v1/deliverables/{}", created["id"]);

    post(
        &pool,
        &format!("{base}/submit"),
        json!({ "submitted_file": "uploads/cap1.pdf" }),
        &f.student_token,
    )
    .await;
    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &coordinator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post(
        &pool,
        &format!("{base}/review"),
        json!({ "verdict": "start_review" }),
        &f.director_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_deliverable_returns_404(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/deliverables/999999", &f.student_token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
