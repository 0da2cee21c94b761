//! Repository for the `hotels` table.

use confdesk_core::lifecycle::BookingStatus;
use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::hotel::{CreateHotel, Hotel, UpdateHotel};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, description, whatsapp_phone, nightly_rate, \
    room_capacity, is_active, created_at, updated_at";

/// Provides CRUD operations for hotels.
pub struct HotelRepo;

impl HotelRepo {
    /// Insert a new hotel. `whatsapp_phone` is expected to be normalized.
    pub async fn create(pool: &PgPool, input: &CreateHotel) -> Result<Hotel, sqlx::Error> {
        let query = format!(
            "INSERT INTO hotels (name, address, description, whatsapp_phone, nightly_rate, room_capacity)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotel>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .bind(&input.whatsapp_phone)
            .bind(input.nightly_rate)
            .bind(input.room_capacity)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hotel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hotels WHERE id = $1");
        sqlx::query_as::<_, Hotel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List hotels by name. Inactive hotels are included only when asked.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Hotel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hotels
             WHERE $1 OR is_active
             ORDER BY name"
        );
        sqlx::query_as::<_, Hotel>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a hotel. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHotel,
    ) -> Result<Option<Hotel>, sqlx::Error> {
        let query = format!(
            "UPDATE hotels SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                description = COALESCE($4, description),
                whatsapp_phone = COALESCE($5, whatsapp_phone),
                nightly_rate = COALESCE($6, nightly_rate),
                room_capacity = COALESCE($7, room_capacity),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotel>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .bind(&input.whatsapp_phone)
            .bind(input.nightly_rate)
            .bind(input.room_capacity)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a hotel that has no pending or confirmed bookings.
    ///
    /// Returns `false` if nothing was deleted (missing, or still booked).
    /// Cancelled bookings keep their `hotel_name` snapshot.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM hotels h
             WHERE h.id = $1
               AND NOT EXISTS (
                   SELECT 1 FROM accommodations a
                   WHERE a.hotel_id = h.id AND a.status IN ($2, $3)
               )",
        )
        .bind(id)
        .bind(BookingStatus::Pending.as_str())
        .bind(BookingStatus::Confirmed.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
