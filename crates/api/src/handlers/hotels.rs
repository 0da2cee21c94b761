//! Handlers for the `/hotels` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::booking::normalize_phone;
use confdesk_core::error::CoreError;
use confdesk_core::types::DbId;
use confdesk_db::models::hotel::{CreateHotel, Hotel, UpdateHotel};
use confdesk_db::repositories::HotelRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/hotels
///
/// Any signed-in user sees active hotels; `?include_inactive=true` is
/// honoured for admins only.
pub async fn list_hotels(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Hotel>>>> {
    let include_inactive = params.include_inactive && user.is_admin();
    let items = HotelRepo::list(&state.pool, include_inactive).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/hotels/{id}
pub async fn get_hotel(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Hotel>>> {
    let hotel = HotelRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|h| h.is_active || user.is_admin())
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Hotel", id }))?;
    Ok(Json(DataResponse { data: hotel }))
}

/// POST /api/v1/hotels
pub async fn create_hotel(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateHotel>,
) -> AppResult<(StatusCode, Json<DataResponse<Hotel>>)> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    input.whatsapp_phone = normalize_phone(&input.whatsapp_phone)?;
    validate_numbers(input.nightly_rate, input.room_capacity)?;

    let hotel = HotelRepo::create(&state.pool, &input).await?;
    tracing::info!(hotel_id = hotel.id, name = %hotel.name, "Hotel created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: hotel })))
}

/// PUT /api/v1/hotels/{id}
pub async fn update_hotel(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateHotel>,
) -> AppResult<Json<DataResponse<Hotel>>> {
    if let Some(name) = input.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "name must not be empty".into(),
            )));
        }
    }
    if let Some(phone) = input.whatsapp_phone.as_deref() {
        input.whatsapp_phone = Some(normalize_phone(phone)?);
    }
    validate_numbers(input.nightly_rate, input.room_capacity)?;

    let hotel = HotelRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Hotel", id }))?;
    Ok(Json(DataResponse { data: hotel }))
}

/// DELETE /api/v1/hotels/{id}
///
/// Hard delete. Refused while the hotel has pending or confirmed bookings;
/// deactivate it instead.
pub async fn delete_hotel(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if HotelRepo::delete(&state.pool, id).await? {
        tracing::info!(hotel_id = id, "Hotel deleted");
        return Ok(StatusCode::NO_CONTENT);
    }

    match HotelRepo::find_by_id(&state.pool, id).await? {
        Some(_) => Err(AppError::Core(CoreError::Conflict(
            "Hotel has open bookings; cancel them or deactivate the hotel".into(),
        ))),
        None => Err(AppError::Core(CoreError::NotFound { entity: "Hotel", id })),
    }
}

fn validate_numbers(nightly_rate: Option<i32>, room_capacity: Option<i32>) -> AppResult<()> {
    if nightly_rate.is_some_and(|r| r < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "nightly_rate must not be negative".into(),
        )));
    }
    if room_capacity.is_some_and(|c| c < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "room_capacity must not be negative".into(),
        )));
    }
    Ok(())
}
