//! Repository for the `scans` table.

use confdesk_core::lifecycle::AccreditationStatus;
use confdesk_core::scan::ScanKind;
use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::scan::{Scan, ScanListQuery, ScanWithParticipant};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, participant_id, validator_id, kind, meal_slot, resource_id, note, scanned_at";

const JOINED_COLUMNS: &str = "s.id, s.participant_id, p.full_name, p.reference_code, \
    s.validator_id, s.kind, s.meal_slot, s.resource_id, s.note, s.scanned_at";

/// Provides access to recorded validator scans.
pub struct ScanRepo;

impl ScanRepo {
    /// Record a meal served to an accredited participant.
    ///
    /// Returns `None` if the participant is missing or not accredited. A
    /// second scan of the same slot violates `uq_scans_meal_slot`.
    pub async fn record_meal(
        pool: &PgPool,
        participant_id: DbId,
        validator_id: DbId,
        meal_slot: &str,
        note: Option<&str>,
    ) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "INSERT INTO scans (participant_id, validator_id, kind, meal_slot, note)
             SELECT p.id, $2, $3, $4, $5
             FROM participants p
             WHERE p.id = $1 AND p.accreditation_status = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(participant_id)
            .bind(validator_id)
            .bind(ScanKind::Meal.as_str())
            .bind(meal_slot)
            .bind(note)
            .bind(AccreditationStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Whether the participant has already been served `meal_slot`.
    pub async fn meal_served(
        pool: &PgPool,
        participant_id: DbId,
        meal_slot: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM scans
                WHERE participant_id = $1 AND kind = $2 AND meal_slot = $3
             )",
        )
        .bind(participant_id)
        .bind(ScanKind::Meal.as_str())
        .bind(meal_slot)
        .fetch_one(pool)
        .await
    }

    /// List scans, newest first. `validator_id = None` lists every validator's scans.
    pub async fn list(
        pool: &PgPool,
        validator_id: Option<DbId>,
        params: &ScanListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScanWithParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM scans s
             JOIN participants p ON p.id = s.participant_id
             WHERE ($1::BIGINT IS NULL OR s.validator_id = $1)
               AND ($2::TEXT IS NULL OR s.kind = $2)
               AND ($3::TEXT IS NULL OR s.meal_slot = $3)
             ORDER BY s.scanned_at DESC, s.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ScanWithParticipant>(&query)
            .bind(validator_id)
            .bind(&params.kind)
            .bind(&params.meal_slot)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All scans recorded for one participant, newest first.
    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: DbId,
    ) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scans
             WHERE participant_id = $1
             ORDER BY scanned_at DESC, id DESC"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(participant_id)
            .fetch_all(pool)
            .await
    }
}
