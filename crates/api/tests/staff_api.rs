//! Staff accounts, duty assignments, dashboards, and database maintenance.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with_cache,
    build_test_app_with_monitor, delete_auth, get, get_auth, login, post_json, post_json_auth,
    put_json_auth, register_participant, validator_token, TEST_PASSWORD,
};
use confdesk_cache::Cache;
use confdesk_db::DbMonitor;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Staff accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_validator_who_can_log_in(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        json!({
            "email": "Gate.Two@example.com",
            "display_name": "Gate Two",
            "password": TEST_PASSWORD,
            "role": "validator",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "gate.two@example.com");
    assert_eq!(json["data"]["role"], "validator");

    login(build_test_app(pool), "gate.two@example.com").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_create_participant_accounts(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/users",
        json!({
            "email": "p@example.com",
            "display_name": "P",
            "password": TEST_PASSWORD,
            "role": "participant",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_users_filters_by_role(pool: PgPool) {
    let admin = admin_token(&pool).await;
    validator_token(&pool, "desk@example.com").await;
    register_participant(&pool, "amina@example.com").await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users?role=validator",
        &admin,
    )
    .await;
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "desk@example.com");

    let response = get_auth(build_test_app(pool), "/api/v1/admin/users?role=wizard", &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_role_cannot_be_changed(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_token, participant) = register_participant(&pool, "amina@example.com").await;
    let user_id = participant["user_id"].as_i64().unwrap();

    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/users/{user_id}"),
        json!({ "role": "admin" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_signs_the_user_out(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (validator, _token) = validator_token(&pool, "desk@example.com").await;

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", validator.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "email": "desk@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_deactivate_self(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let response = get_auth(build_test_app(pool.clone()), "/api/v1/auth/me", &admin).await;
    let admin_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/users/{admin_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_replaces_credentials(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (validator, _token) = validator_token(&pool, "desk@example.com").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}/reset-password", validator.id),
        json!({ "new_password": "freshstart2026" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "desk@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "email": "desk@example.com", "password": "freshstart2026" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignment_lifecycle(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (validator, validator_jwt) = validator_token(&pool, "desk@example.com").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/assignments",
        json!({
            "validator_id": validator.id,
            "title": "Main hall check-in",
            "location": "Hall A",
            "starts_at": "2026-11-10T07:00:00Z",
            "ends_at": "2026-11-10T12:00:00Z",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/me/assignments",
        &validator_jwt,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Main hall check-in");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/assignments/{id}"),
        json!({ "location": "Hall B" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["location"], "Hall B");

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/assignments/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/assignments/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignment_rejects_inverted_window(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (validator, _jwt) = validator_token(&pool, "desk@example.com").await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/assignments",
        json!({
            "validator_id": validator.id,
            "title": "Lunch queue",
            "starts_at": "2026-11-10T13:00:00Z",
            "ends_at": "2026-11-10T12:00:00Z",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignment_needs_a_validator(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_token, participant) = register_participant(&pool, "amina@example.com").await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/assignments",
        json!({
            "validator_id": participant["user_id"],
            "title": "Lunch queue",
            "starts_at": "2026-11-10T12:00:00Z",
            "ends_at": "2026-11-10T13:00:00Z",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Dashboards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_dashboard_refreshes_after_registration(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let cache = Cache::memory();

    let response = get_auth(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        "/api/v1/dashboard/admin",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total_participants"], 0);

    let response = post_json(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        "/api/v1/auth/register",
        json!({
            "email": "amina@example.com",
            "password": TEST_PASSWORD,
            "full_name": "Amina Okafor",
            "school": "Lagos Business School",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        build_test_app_with_cache(pool, cache),
        "/api/v1/dashboard/admin",
        &admin,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["total_participants"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_dashboard_shows_own_record(pool: PgPool) {
    let (token, participant) = register_participant(&pool, "amina@example.com").await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/dashboard/participant", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["participant"]["id"], participant["id"]);
    assert!(json["data"]["bookings"].as_array().unwrap().is_empty());

    // Participants do not get the admin view.
    let response = get_auth(build_test_app(pool), "/api/v1/dashboard/admin", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validator_dashboard_counts_own_scans(pool: PgPool) {
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;

    let response = get_auth(build_test_app(pool), "/api/v1/dashboard/validator", &validator).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["overview"]["scans_total"], 0);
    assert!(json["data"]["assignments"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Database maintenance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn db_stats_lists_tables_and_monitor(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = get_auth(build_test_app(pool), "/api/v1/admin/db/stats", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["database"]["size_bytes"].as_i64().unwrap() > 0);
    assert!(!json["data"]["tables"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["cache_backend"], "memory");
    assert!(json["data"]["monitor"]["pool_size"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn monitor_counts_requests_and_database_failures(pool: PgPool) {
    let monitor = Arc::new(DbMonitor::new());

    let response = get(
        build_test_app_with_monitor(pool.clone(), monitor.clone()),
        "/api/v1/health",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A duplicate is a client error, not a database failure.
    register_participant(&pool, "amina@example.com").await;
    let response = post_json(
        build_test_app_with_monitor(pool.clone(), monitor.clone()),
        "/api/v1/auth/register",
        json!({
            "email": "amina@example.com",
            "password": TEST_PASSWORD,
            "full_name": "Amina Okafor",
            "school": "Lagos Business School",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    pool.close().await;
    let response = post_json(
        build_test_app_with_monitor(pool.clone(), monitor.clone()),
        "/api/v1/auth/login",
        json!({ "email": "amina@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let snapshot = monitor.snapshot(&pool);
    assert_eq!(snapshot.requests_served, 3);
    assert_eq!(snapshot.db_failures, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vacuum_and_reindex_whitelisted_tables(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/db/vacuum",
        json!({ "table": "participants", "analyze": true }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["operation"], "vacuum_analyze");
    assert_eq!(json["data"]["table"], "participants");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/db/reindex",
        json!({ "table": "scans" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/db/vacuum",
        json!({ "table": "pg_class; DROP TABLE users" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn kill_idle_validates_threshold(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/db/kill-idle",
        json!({ "older_than_secs": 5 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/db/kill-idle",
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["operation"], "kill_idle");
    assert!(json["data"]["affected"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validator_cannot_run_maintenance(pool: PgPool) {
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/db/vacuum",
        json!({ "table": "users" }),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
