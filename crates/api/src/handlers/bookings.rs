//! Hotel booking requests (`/bookings`).
//!
//! A participant files a request, gets a WhatsApp deep link to send to the
//! hotel, and an admin confirms once the hotel acknowledges it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use confdesk_core::booking::{self, BookingRequestText};
use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::{BookingAction, BookingStatus};
use confdesk_core::types::DbId;
use confdesk_db::models::accommodation::{
    Accommodation, AccommodationListQuery, CreateAccommodation,
};
use confdesk_db::repositories::{AccommodationRepo, ConfirmOutcome, HotelRepo, ParticipantRepo};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::{dashboard, participants};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireParticipant};
use crate::query::Page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub hotel_id: DbId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_guests")]
    pub guests: i32,
    pub notes: Option<String>,
}

fn default_guests() -> i32 {
    1
}

/// POST /api/v1/bookings
///
/// Creates a `pending` booking and returns it with the prefilled
/// `whatsapp_link` for the hotel desk.
pub async fn create_booking(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
    Json(input): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Accommodation>>)> {
    booking::validate_stay(input.check_in, input.check_out)?;
    booking::validate_guests(input.guests)?;

    let participant = participants::participant_for_user(&state.pool, user.user_id).await?;

    let hotel = HotelRepo::find_by_id(&state.pool, input.hotel_id)
        .await?
        .filter(|h| h.is_active)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hotel",
            id: input.hotel_id,
        }))?;

    let message = booking::booking_message(&BookingRequestText {
        hotel_name: &hotel.name,
        participant_name: &participant.full_name,
        reference_code: &participant.reference_code,
        check_in: input.check_in,
        check_out: input.check_out,
        guests: input.guests,
    });
    let whatsapp_link = booking::whatsapp_link(&hotel.whatsapp_phone, &message)?;

    let create = CreateAccommodation {
        participant_id: participant.id,
        hotel_id: hotel.id,
        hotel_name: hotel.name.clone(),
        check_in: input.check_in,
        check_out: input.check_out,
        guests: input.guests,
        notes: input.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        whatsapp_link,
    };
    let accommodation = AccommodationRepo::request(&state.pool, &create)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "You already have a booking for overlapping dates".into(),
            ))
        })?;

    tracing::info!(
        booking_id = accommodation.id,
        participant_id = participant.id,
        hotel_id = hotel.id,
        "Booking requested"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: accommodation })))
}

/// GET /api/v1/me/bookings
pub async fn list_my_bookings(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Accommodation>>>> {
    let participant = participants::participant_for_user(&state.pool, user.user_id).await?;
    let items = AccommodationRepo::list_for_participant(&state.pool, participant.id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/bookings
pub async fn list_bookings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AccommodationListQuery>,
) -> AppResult<Json<DataResponse<Vec<Accommodation>>>> {
    if let Some(status) = params.status.as_deref() {
        BookingStatus::parse(status)?;
    }
    let page = Page::clamp(params.limit, params.offset);

    let items = AccommodationRepo::list(&state.pool, &params, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/bookings/{id}/confirm
///
/// Confirms a pending booking if the hotel still has a free room for
/// every night of the stay.
pub async fn confirm_booking(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Accommodation>>> {
    let current = find_booking(&state.pool, id).await?;
    current.booking_status()?.apply(BookingAction::Confirm)?;

    let accommodation = match AccommodationRepo::confirm(&state.pool, id).await? {
        ConfirmOutcome::Confirmed(a) => a,
        ConfirmOutcome::NotPending => {
            return Err(AppError::Core(CoreError::Conflict(
                "Booking is no longer pending".into(),
            )))
        }
        ConfirmOutcome::HotelUnavailable => {
            return Err(AppError::Core(CoreError::Conflict(
                "Hotel is no longer available".into(),
            )))
        }
        ConfirmOutcome::Full => {
            return Err(AppError::Core(CoreError::Conflict(
                "Hotel has no free rooms for these dates".into(),
            )))
        }
    };

    tracing::info!(booking_id = id, admin_id = admin.user_id, "Booking confirmed");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse { data: accommodation }))
}

/// POST /api/v1/bookings/{id}/cancel
///
/// The owning participant or an admin may cancel.
pub async fn cancel_booking(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Accommodation>>> {
    let current = find_booking(&state.pool, id).await?;

    if !user.is_admin() {
        let owns = user.is_participant()
            && ParticipantRepo::find_by_user_id(&state.pool, user.user_id)
                .await?
                .is_some_and(|p| p.id == current.participant_id);
        if !owns {
            // Other people's bookings are reported as missing.
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Booking",
                id,
            }));
        }
    }

    current.booking_status()?.apply(BookingAction::Cancel)?;

    let accommodation = AccommodationRepo::cancel(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Booking is cancelled".into())))?;

    tracing::info!(booking_id = id, user_id = user.user_id, "Booking cancelled");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse { data: accommodation }))
}

async fn find_booking(pool: &PgPool, id: DbId) -> AppResult<Accommodation> {
    AccommodationRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        }))
}
