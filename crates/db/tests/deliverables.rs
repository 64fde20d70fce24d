//! Integration tests for deliverable status transitions and their history.

use assert_matches::assert_matches;
use gestion_core::error::CoreError;
use gestion_core::roles::Role;
use gestion_core::status::DeliverableStatus;
use gestion_core::types::DbId;
use gestion_db::models::deliverable::{CreateDeliverable, Deliverable, TransitionChanges};
use gestion_db::models::project::CreateProject;
use gestion_db::models::user::CreateUser;
use gestion_db::repositories::{DeliverableRepo, ProjectRepo, UserRepo};
use gestion_db::DbError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed(pool: &PgPool) -> (DbId, DbId, Deliverable) {
    let student = UserRepo::create(
        pool,
        &CreateUser {
            name: "Student".to_string(),
            email: "student@uni.edu".to_string(),
            password_hash: "x".to_string(),
            role_id: Role::Student.id(),
            work_area_id: None,
        },
    )
    .await
    .unwrap();
    let director = UserRepo::create(
        pool,
        &CreateUser {
            name: "Director".to_string(),
            email: "director@uni.edu".to_string(),
            password_hash: "x".to_string(),
            role_id: Role::Director.id(),
            work_area_id: None,
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            title: "Tesis".to_string(),
            description: None,
            status_id: None,
            student_id: Some(student.id),
            director_id: Some(director.id),
            work_area_id: None,
            created_by: None,
        },
    )
    .await
    .unwrap();
    let deliverable = DeliverableRepo::create(
        pool,
        project.id,
        &CreateDeliverable {
            phase: Some("Anteproyecto".to_string()),
            title: "Propuesta".to_string(),
            description: None,
            original_file: Some("briefs/propuesta.pdf".to_string()),
            assignee_id: Some(student.id),
            due_date: None,
        },
    )
    .await
    .unwrap();
    (student.id, director.id, deliverable)
}

fn submit(file: &str) -> TransitionChanges {
    TransitionChanges {
        submitted_file: Some(file.to_string()),
        feedback: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_deliverables_start_pending(pool: PgPool) {
    let (_, _, deliverable) = seed(&pool).await;
    assert_eq!(deliverable.status_id, DeliverableStatus::Pending.id());
    assert!(deliverable.submitted_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_review_cycle_records_history(pool: PgPool) {
    let (student, director, deliverable) = seed(&pool).await;

    let submitted = DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::Submitted,
        student,
        None,
        &submit("uploads/v1.pdf"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(submitted.status_id, DeliverableStatus::Submitted.id());
    assert_eq!(submitted.submitted_file.as_deref(), Some("uploads/v1.pdf"));
    assert!(submitted.submitted_at.is_some());

    DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::UnderReview,
        director,
        None,
        &TransitionChanges::default(),
    )
    .await
    .unwrap()
    .unwrap();

    let changes = DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::ChangesRequested,
        director,
        Some("Falta bibliografía"),
        &TransitionChanges {
            submitted_file: None,
            feedback: Some("Falta bibliografía".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(changes.feedback.as_deref(), Some("Falta bibliografía"));
    assert!(changes.reviewed_at.is_some());
    // The previous submission is kept until a new one replaces it.
    assert_eq!(changes.submitted_file.as_deref(), Some("uploads/v1.pdf"));

    let resubmitted = DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::Submitted,
        student,
        None,
        &submit("uploads/v2.pdf"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(resubmitted.submitted_file.as_deref(), Some("uploads/v2.pdf"));

    let history = DeliverableRepo::history(&pool, deliverable.id).await.unwrap();
    let steps: Vec<(i16, i16)> = history
        .iter()
        .map(|h| (h.from_status_id, h.to_status_id))
        .collect();
    assert_eq!(
        steps,
        vec![
            (1, 2), // pending -> submitted
            (2, 3), // submitted -> under_review
            (3, 6), // under_review -> changes_requested
            (6, 2), // changes_requested -> submitted
        ]
    );
    assert_eq!(history[2].changed_by, Some(director));
    assert_eq!(history[2].note.as_deref(), Some("Falta bibliografía"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_transition_changes_nothing(pool: PgPool) {
    let (_, director, deliverable) = seed(&pool).await;

    let result = DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::Accepted,
        director,
        None,
        &TransitionChanges::default(),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));

    let reloaded = DeliverableRepo::find_by_id(&pool, deliverable.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status_id, DeliverableStatus::Pending.id());
    assert!(DeliverableRepo::history(&pool, deliverable.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_deliverable_returns_none(pool: PgPool) {
    let (student, _, _) = seed(&pool).await;
    let result = DeliverableRepo::transition(
        &pool,
        999_999,
        DeliverableStatus::Submitted,
        student,
        None,
        &submit("x.pdf"),
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_by_project_returns_project_deliverables(pool: PgPool) {
    let (_, _, deliverable) = seed(&pool).await;
    let listed = DeliverableRepo::list_by_project(&pool, deliverable.project_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Propuesta");
    assert_eq!(listed[0].phase.as_deref(), Some("Anteproyecto"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn last_submitter_follows_latest_submission(pool: PgPool) {
    let (student, director, deliverable) = seed(&pool).await;
    assert_eq!(
        DeliverableRepo::last_submitter(&pool, deliverable.id).await.unwrap(),
        None
    );

    DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::Submitted,
        student,
        None,
        &submit("uploads/v1.pdf"),
    )
    .await
    .unwrap()
    .unwrap();
    DeliverableRepo::transition(
        &pool,
        deliverable.id,
        DeliverableStatus::Submitted,
        director,
        Some("Replaced file"),
        &submit("uploads/v2.pdf"),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        DeliverableRepo::last_submitter(&pool, deliverable.id).await.unwrap(),
        Some(director)
    );
}
