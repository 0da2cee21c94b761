//! Accommodation (hotel booking) model and DTOs.

use chrono::NaiveDate;
use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::BookingStatus;
use confdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `accommodations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Accommodation {
    pub id: DbId,
    pub participant_id: DbId,
    /// `None` once the hotel has been deleted; `hotel_name` is kept.
    pub hotel_id: Option<DbId>,
    pub hotel_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub status: String,
    pub notes: Option<String>,
    pub whatsapp_link: String,
    pub confirmed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Accommodation {
    pub fn booking_status(&self) -> Result<BookingStatus, CoreError> {
        BookingStatus::parse(&self.status)
    }
}

/// DTO for inserting a booking request.
#[derive(Debug, Clone)]
pub struct CreateAccommodation {
    pub participant_id: DbId,
    pub hotel_id: DbId,
    pub hotel_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub notes: Option<String>,
    pub whatsapp_link: String,
}

/// Filters for the admin booking listing.
#[derive(Debug, Default, Deserialize)]
pub struct AccommodationListQuery {
    pub status: Option<String>,
    pub hotel_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
