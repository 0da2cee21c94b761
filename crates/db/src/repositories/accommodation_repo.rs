//! Repository for the `accommodations` table (hotel bookings).

use confdesk_core::lifecycle::BookingStatus;
use confdesk_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::accommodation::{
    Accommodation, AccommodationListQuery, CreateAccommodation,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, participant_id, hotel_id, hotel_name, check_in, check_out, guests, \
    status, notes, whatsapp_link, confirmed_at, cancelled_at, created_at, updated_at";

/// Result of [`AccommodationRepo::confirm`].
#[derive(Debug)]
pub enum ConfirmOutcome {
    Confirmed(Accommodation),
    /// The booking does not exist or is no longer pending.
    NotPending,
    /// The hotel was deleted or deactivated.
    HotelUnavailable,
    /// Every room is taken on at least one night of the stay.
    Full,
}

/// Provides booking requests and their confirmation workflow.
pub struct AccommodationRepo;

impl AccommodationRepo {
    /// Insert a pending booking request. [`request`](Self::request) adds the
    /// overlap guard.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateAccommodation,
    ) -> Result<Accommodation, sqlx::Error> {
        let query = format!(
            "INSERT INTO accommodations
                (participant_id, hotel_id, hotel_name, check_in, check_out, guests, notes, whatsapp_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Accommodation>(&query)
            .bind(input.participant_id)
            .bind(input.hotel_id)
            .bind(&input.hotel_name)
            .bind(input.check_in)
            .bind(input.check_out)
            .bind(input.guests)
            .bind(&input.notes)
            .bind(&input.whatsapp_link)
            .fetch_one(executor)
            .await
    }

    /// Insert a booking request unless the participant already holds an
    /// open booking for overlapping dates (`None`).
    ///
    /// The participant row is locked while checking, so concurrent requests
    /// from the same participant are decided one at a time.
    pub async fn request(
        pool: &PgPool,
        input: &CreateAccommodation,
    ) -> Result<Option<Accommodation>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM participants WHERE id = $1 FOR UPDATE")
            .bind(input.participant_id)
            .fetch_optional(&mut *tx)
            .await?;

        if Self::has_overlapping_open(&mut *tx, input.participant_id, input.check_in, input.check_out)
            .await?
        {
            tx.rollback().await?;
            return Ok(None);
        }

        let booking = Self::create(&mut *tx, input).await?;
        tx.commit().await?;
        Ok(Some(booking))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Accommodation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accommodations WHERE id = $1");
        sqlx::query_as::<_, Accommodation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A participant's bookings, newest first.
    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: DbId,
    ) -> Result<Vec<Accommodation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM accommodations
             WHERE participant_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Accommodation>(&query)
            .bind(participant_id)
            .fetch_all(pool)
            .await
    }

    /// Admin listing with optional status and hotel filters.
    pub async fn list(
        pool: &PgPool,
        params: &AccommodationListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Accommodation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM accommodations
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR hotel_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Accommodation>(&query)
            .bind(&params.status)
            .bind(params.hotel_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Whether the participant already holds an open booking overlapping the stay.
    pub async fn has_overlapping_open<'e>(
        executor: impl PgExecutor<'e>,
        participant_id: DbId,
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM accommodations
                WHERE participant_id = $1
                  AND status IN ($4, $5)
                  AND check_in < $3 AND check_out > $2
             )",
        )
        .bind(participant_id)
        .bind(check_in)
        .bind(check_out)
        .bind(BookingStatus::Pending.as_str())
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(executor)
        .await
    }

    /// Confirm a pending booking if the hotel still has a free room.
    ///
    /// The hotel row is locked for the duration of the check so two
    /// concurrent confirmations cannot both take the last room.
    pub async fn confirm(pool: &PgPool, id: DbId) -> Result<ConfirmOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM accommodations WHERE id = $1 FOR UPDATE");
        let booking = sqlx::query_as::<_, Accommodation>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(booking) = booking.filter(|b| b.status == BookingStatus::Pending.as_str()) else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::NotPending);
        };

        let Some(hotel_id) = booking.hotel_id else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::HotelUnavailable);
        };

        let capacity: Option<i32> = sqlx::query_scalar(
            "SELECT room_capacity FROM hotels WHERE id = $1 AND is_active FOR UPDATE",
        )
        .bind(hotel_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(capacity) = capacity else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::HotelUnavailable);
        };

        // Rooms are needed per night: the busiest night of the stay decides.
        let taken: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(occupied), 0) FROM (
                 SELECT g.night, COUNT(a.id) AS occupied
                 FROM generate_series($3::DATE, $4::DATE - 1, INTERVAL '1 day') AS g(night)
                 LEFT JOIN accommodations a
                   ON a.hotel_id = $1 AND a.status = $2
                  AND a.check_in <= g.night::DATE AND a.check_out > g.night::DATE
                 GROUP BY g.night
             ) per_night",
        )
        .bind(hotel_id)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(booking.check_in)
        .bind(booking.check_out)
        .fetch_one(&mut *tx)
        .await?;

        if taken >= i64::from(capacity) {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::Full);
        }

        let update = format!(
            "UPDATE accommodations SET status = $2, confirmed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let confirmed = sqlx::query_as::<_, Accommodation>(&update)
            .bind(id)
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ConfirmOutcome::Confirmed(confirmed))
    }

    /// Cancel a pending or confirmed booking. Returns `None` if already cancelled.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Accommodation>, sqlx::Error> {
        let query = format!(
            "UPDATE accommodations SET status = $2, cancelled_at = NOW()
             WHERE id = $1 AND status IN ($3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Accommodation>(&query)
            .bind(id)
            .bind(BookingStatus::Cancelled.as_str())
            .bind(BookingStatus::Pending.as_str())
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_optional(pool)
            .await
    }
}
