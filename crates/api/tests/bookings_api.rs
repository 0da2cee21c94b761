mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, delete_auth, get_auth, post_json_auth, put_json_auth,
    register_participant,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_hotel(pool: &PgPool, admin: &str, name: &str, rooms: i32) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/hotels",
        json!({
            "name": name,
            "address": "Jl. Sudirman 1",
            "whatsapp_phone": "+62 812-3456-7890",
            "nightly_rate": 450000,
            "room_capacity": rooms,
        }),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn request_booking(
    pool: &PgPool,
    token: &str,
    hotel_id: i64,
    check_in: &str,
    check_out: &str,
) -> axum::response::Response {
    post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        json!({
            "hotel_id": hotel_id,
            "check_in": check_in,
            "check_out": check_out,
            "guests": 2,
        }),
        token,
    )
    .await
}

fn booking_id(json: &Value) -> i64 {
    json["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Hotels
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn hotel_phone_is_normalized(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = get_auth(build_test_app(pool), &format!("/api/v1/hotels/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["whatsapp_phone"], "6281234567890");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_hotels_hidden_from_participants(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;
    create_hotel(&pool, &admin, "Hotel Borobudur", 10).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/hotels/{id}"),
        json!({ "is_active": false }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/hotels?include_inactive=true",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/hotels/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/hotels?include_inactive=true",
        &admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_cannot_create_hotel(pool: PgPool) {
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/hotels",
        json!({ "name": "Sneaky Inn", "whatsapp_phone": "6281234567890" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hotel_with_open_bookings_cannot_be_deleted(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = request_booking(&pool, &token, hotel_id, "2026-11-10", "2026-11-12").await;
    let id = booking_id(&body_json(response).await);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/hotels/{hotel_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{id}/cancel"),
        json!({}),
        &token,
    )
    .await;

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/hotels/{hotel_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn booking_returns_whatsapp_link(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, participant) = register_participant(&pool, "amina@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = request_booking(&pool, &token, hotel_id, "2026-11-10", "2026-11-13").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["hotel_name"], "Hotel Mulia");

    let link = json["data"]["whatsapp_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/6281234567890?text="), "{link}");
    let code = participant["reference_code"].as_str().unwrap();
    assert!(link.contains(code), "link should carry the reference code");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn booking_rejects_bad_dates(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = request_booking(&pool, &token, hotel_id, "2026-11-12", "2026-11-12").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request_booking(&pool, &token, hotel_id, "2026-11-01", "2026-12-01").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_booking_conflicts(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = request_booking(&pool, &token, hotel_id, "2026-11-10", "2026-11-13").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = request_booking(&pool, &token, hotel_id, "2026-11-12", "2026-11-14").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Back-to-back stays do not overlap.
    let response = request_booking(&pool, &token, hotel_id, "2026-11-13", "2026-11-15").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirmation_respects_room_capacity(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (first, _) = register_participant(&pool, "first@example.com").await;
    let (second, _) = register_participant(&pool, "second@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Tiny Guesthouse", 1).await;

    let response = request_booking(&pool, &first, hotel_id, "2026-11-10", "2026-11-12").await;
    let first_id = booking_id(&body_json(response).await);
    let response = request_booking(&pool, &second, hotel_id, "2026-11-11", "2026-11-13").await;
    let second_id = booking_id(&body_json(response).await);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{first_id}/confirm"),
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "confirmed");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{second_id}/confirm"),
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Hotel has no free rooms for these dates"
    );

    // Cancelling the first frees the room.
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{first_id}/cancel"),
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/bookings/{second_id}/confirm"),
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_or_admin_can_cancel(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (owner, _) = register_participant(&pool, "owner@example.com").await;
    let (other, _) = register_participant(&pool, "other@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;

    let response = request_booking(&pool, &owner, hotel_id, "2026-11-10", "2026-11-12").await;
    let id = booking_id(&body_json(response).await);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{id}/cancel"),
        json!({}),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{id}/cancel"),
        json!({}),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "cancelled");

    // Cancelling twice is a conflict.
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{id}/cancel"),
        json!({}),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(build_test_app(pool), "/api/v1/me/bookings", &owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_filters_bookings_by_status(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let (token, _) = register_participant(&pool, "amina@example.com").await;
    let hotel_id = create_hotel(&pool, &admin, "Hotel Mulia", 10).await;
    request_booking(&pool, &token, hotel_id, "2026-11-10", "2026-11-12").await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/bookings?status=pending",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/bookings?status=maybe",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
