//! Settings and distributable resources.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with_cache, delete_auth, get,
    get_auth, post_json_auth, put_json_auth, register_participant, validator_token,
};
use confdesk_cache::Cache;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn accredited_participant(
    pool: &PgPool,
    admin: &str,
    validator: &str,
    email: &str,
) -> (String, Value) {
    let (token, participant) = register_participant(pool, email).await;
    let id = participant["id"].as_i64().unwrap();
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/participants/{id}/payment/approve"),
        json!({}),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/scans/accreditation",
        json!({ "payload": participant["reference_code"] }),
        validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    (token, participant)
}

async fn create_resource(pool: &PgPool, admin: &str, title: &str, accredited_only: bool) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/resources",
        json!({
            "title": title,
            "url": "https://files.example.com/kit.pdf",
            "requires_accreditation": accredited_only,
        }),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_settings_need_no_auth(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/settings/public").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["event_name"], "Annual Conference");
    assert_eq!(json["data"]["registration_open"], "true");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn private_settings_stay_out_of_public_view(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/meal_slots",
        json!({ "value": "day1-lunch" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(pool), "/api/v1/settings/public").await;
    let json = body_json(response).await;
    assert!(json["data"].get("meal_slots").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updating_public_setting_refreshes_cache(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let cache = Cache::memory();

    let response = get(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        "/api/v1/settings/public",
    )
    .await;
    assert_eq!(body_json(response).await["data"]["event_name"], "Annual Conference");

    let response = put_json_auth(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        "/api/v1/settings/event_name",
        json!({ "value": "Regional Summit 2026" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        build_test_app_with_cache(pool, cache),
        "/api/v1/settings/public",
    )
    .await;
    assert_eq!(
        body_json(response).await["data"]["event_name"],
        "Regional Summit 2026"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn setting_values_are_validated(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/registration_open",
        json!({ "value": "perhaps" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/settings/Bad-Key",
        json!({ "value": "x" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_setting_then_missing(pool: PgPool) {
    let admin = admin_token(&pool).await;

    let response = delete_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/event_name",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/event_name",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(build_test_app(pool), "/api/v1/settings/event_name", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validator_cannot_change_settings(pool: PgPool) {
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;
    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/settings/event_name",
        json!({ "value": "Hijacked" }),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn resource_distributed_once_per_participant(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;
    let (_token, participant) =
        accredited_participant(&pool, &admin, &validator, "amina@example.com").await;
    let resource_id = create_resource(&pool, &admin, "Delegate kit", true).await;

    let body = json!({ "payload": participant["qr_payload"] });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/resources/{resource_id}/distribute"),
        body.clone(),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["scan"]["kind"], "resource");
    assert_eq!(json["data"]["scan"]["resource_id"], resource_id);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/resources/{resource_id}/distribute"),
        body,
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Resource already given to this participant"
    );

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/resources/{resource_id}/recipients"),
        &validator,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn distribution_refreshes_admin_overview(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;
    let (_token, participant) =
        accredited_participant(&pool, &admin, &validator, "amina@example.com").await;
    let resource_id = create_resource(&pool, &admin, "Delegate kit", false).await;
    let cache = Cache::memory();

    let response = get_auth(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        "/api/v1/dashboard/admin",
        &admin,
    )
    .await;
    let before = body_json(response).await["data"]["scans_today"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app_with_cache(pool.clone(), cache.clone()),
        &format!("/api/v1/resources/{resource_id}/distribute"),
        json!({ "payload": participant["qr_payload"] }),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        build_test_app_with_cache(pool, cache),
        "/api/v1/dashboard/admin",
        &admin,
    )
    .await;
    assert_eq!(
        body_json(response).await["data"]["scans_today"].as_i64().unwrap(),
        before + 1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn accredited_only_resource_refused_before_accreditation(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;
    let (_token, participant) = register_participant(&pool, "amina@example.com").await;
    let resource_id = create_resource(&pool, &admin, "Delegate kit", true).await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/resources/{resource_id}/distribute"),
        json!({ "payload": participant["reference_code"] }),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_resource_given_without_accreditation(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (_user, validator) = validator_token(&pool, "desk@example.com").await;
    let (_token, participant) = register_participant(&pool, "amina@example.com").await;
    let resource_id = create_resource(&pool, &admin, "Programme booklet", false).await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/resources/{resource_id}/distribute"),
        json!({ "payload": participant["reference_code"] }),
        &validator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_sees_only_eligible_resources(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _participant) = register_participant(&pool, "amina@example.com").await;
    create_resource(&pool, &admin, "Delegate kit", true).await;
    create_resource(&pool, &admin, "Programme booklet", false).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/resources", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Programme booklet");
    assert!(items[0]["granted_at"].is_null());

    let response = get_auth(build_test_app(pool), "/api/v1/resources", &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resource_crud_by_admin(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let id = create_resource(&pool, &admin, "Slides", false).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/resources/{id}"),
        json!({ "title": "Keynote slides" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Keynote slides");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/resources/{id}"),
        json!({ "title": "  " }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/resources/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/resources/{id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
