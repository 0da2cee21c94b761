#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use confdesk_api::auth::jwt::JwtConfig;
use confdesk_api::auth::password::hash_password;
use confdesk_api::config::ServerConfig;
use confdesk_api::router::build_app_router;
use confdesk_api::state::AppState;
use confdesk_cache::Cache;
use confdesk_db::models::user::{CreateUser, User};
use confdesk_db::repositories::UserRepo;
use confdesk_db::DbMonitor;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_ROLE_ID: i64 = 1;
pub const VALIDATOR_ROLE_ID: i64 = 2;

/// Password used for every account created by these helpers.
pub const TEST_PASSWORD: &str = "conference2026";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
        redis_url: None,
        reference_prefix: "CONF".to_string(),
        session_cleanup_interval_secs: 3600,
        dashboard_cache_ttl_secs: 30,
        jwt: JwtConfig {
            secret: "confdesk-integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the production router over `pool` with an in-memory cache.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_cache(pool, Cache::memory())
}

/// Same as [`build_test_app`] but with a caller-supplied cache, so a test
/// can observe entries across requests.
pub fn build_test_app_with_cache(pool: PgPool, cache: Cache) -> Router {
    assemble(pool, cache, Arc::new(DbMonitor::new()))
}

/// Same as [`build_test_app`] but recording into a caller-held monitor.
pub fn build_test_app_with_monitor(pool: PgPool, monitor: Arc<DbMonitor>) -> Router {
    assemble(pool, Cache::memory(), monitor)
}

fn assemble(pool: PgPool, cache: Cache, monitor: Arc<DbMonitor>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
        monitor,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

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
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
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

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Insert a staff account directly and return it.
pub async fn create_staff(pool: &PgPool, email: &str, role_id: i64) -> User {
    let input = CreateUser {
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login for {email} should succeed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

/// Create an admin and return its access token.
pub async fn admin_token(pool: &PgPool) -> String {
    create_staff(pool, "admin@confdesk.test", ADMIN_ROLE_ID).await;
    login(build_test_app(pool.clone()), "admin@confdesk.test").await
}

/// Create a validator and return `(user, access token)`.
pub async fn validator_token(pool: &PgPool, email: &str) -> (User, String) {
    let user = create_staff(pool, email, VALIDATOR_ROLE_ID).await;
    let token = login(build_test_app(pool.clone()), email).await;
    (user, token)
}

/// Self-register a participant through the API.
///
/// Returns the access token and the `participant` object from the response.
pub async fn register_participant(pool: &PgPool, email: &str) -> (String, Value) {
    let body = serde_json::json!({
        "email": email,
        "password": TEST_PASSWORD,
        "full_name": "Amina Okafor",
        "phone": "+234 803 555 0101",
        "school": "Lagos Business School",
        "chapter": "West",
        "city": "Lagos",
    });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration should succeed");
    let json = body_json(response).await;
    let token = json["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string();
    (token, json["participant"].clone())
}
