#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use gestion_api::auth::jwt::{generate_access_token, JwtConfig};
use gestion_api::auth::password::hash_password;
use gestion_api::config::ServerConfig;
use gestion_api::router::build_app_router;
use gestion_api::state::AppState;
use gestion_core::access::AreaPolicy;
use gestion_core::membership::{MemberStatus, ProjectRole};
use gestion_core::roles::Role;
use gestion_core::types::DbId;
use gestion_db::models::project::{CreateProject, Project};
use gestion_db::models::user::{CreateUser, User};
use gestion_db::repositories::{ProjectMemberRepo, ProjectRepo, UserRepo};

/// Password given to every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        access_policy: AreaPolicy::InheritFromMembership,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router, with the production middleware
/// stack, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_area(pool: &PgPool, name: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as("INSERT INTO areas_trabajo (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

/// Create a user with [`TEST_PASSWORD`]. The email is `<handle>@uni.edu`.
pub async fn create_user(pool: &PgPool, handle: &str, role: Role, area: Option<DbId>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: handle.to_string(),
            email: format!("{handle}@uni.edu"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role.id(),
            work_area_id: area,
        },
    )
    .await
    .unwrap()
}

/// Mint an access token for `user` with the test secret.
pub fn token_for(user: &User) -> String {
    let role = Role::from_id(user.role_id).unwrap();
    generate_access_token(user.id, role, &test_config().jwt).unwrap()
}

/// Create a user and return it together with an access token.
pub async fn user_with_token(
    pool: &PgPool,
    handle: &str,
    role: Role,
    area: Option<DbId>,
) -> (User, String) {
    let user = create_user(pool, handle, role, area).await;
    let token = token_for(&user);
    (user, token)
}

pub async fn create_project(pool: &PgPool, title: &str, area: Option<DbId>) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            title: title.to_string(),
            description: None,
            status_id: None,
            student_id: None,
            director_id: None,
            work_area_id: area,
            created_by: None,
        },
    )
    .await
    .unwrap()
}

pub async fn add_member(pool: &PgPool, project_id: DbId, user_id: DbId, role: ProjectRole) {
    ProjectMemberRepo::upsert(pool, project_id, user_id, role, MemberStatus::Active)
        .await
        .unwrap();
}
