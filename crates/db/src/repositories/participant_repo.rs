//! Repository for the `participants` table.
//!
//! Owns the registration -> payment -> accreditation transitions. Every
//! transition method guards on the expected current status so two admins
//! (or two validators at different gates) cannot both win.

use confdesk_core::lifecycle::{AccreditationStatus, PaymentStatus};
use confdesk_core::reference;
use confdesk_core::scan::ScanKind;
use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::participant::{
    CreateParticipant, Participant, ParticipantListQuery, ParticipantSummary, UpdateParticipant,
};
use crate::models::scan::Scan;
use crate::models::user::{CreateUser, User};
use crate::repositories::scan_repo::COLUMNS as SCAN_COLUMNS;
use crate::repositories::user_repo::COLUMNS as USER_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, full_name, phone, school, chapter, city, reference_code, \
    payment_status, payment_proof_url, payment_submitted_at, payment_reviewed_at, \
    payment_reviewed_by, payment_note, accreditation_status, accredited_at, accredited_by, \
    created_at, updated_at";

/// Columns for [`ParticipantSummary`], selected from `participants p JOIN users u`.
const SUMMARY_COLUMNS: &str = "p.id, p.user_id, u.email, p.full_name, p.school, p.chapter, \
    p.reference_code, p.payment_status, p.accreditation_status, p.created_at";

/// Shared `WHERE` clause for listing and counting.
const LIST_FILTER: &str = "WHERE ($1::TEXT IS NULL OR p.payment_status = $1)
       AND ($2::TEXT IS NULL OR p.accreditation_status = $2)
       AND ($3::TEXT IS NULL
            OR p.full_name ILIKE '%' || $3 || '%'
            OR u.email ILIKE '%' || $3 || '%'
            OR p.school ILIKE '%' || $3 || '%'
            OR p.reference_code ILIKE '%' || $3 || '%')";

/// Provides registration records and their status transitions.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Create the user account and its registration record in one transaction.
    ///
    /// A fresh reference code is generated for the record; on the unlikely
    /// event of a collision another code is tried. Returns `None` if no
    /// unused code was found after [`reference::MAX_GENERATION_ATTEMPTS`].
    pub async fn register(
        pool: &PgPool,
        user: &CreateUser,
        input: &CreateParticipant,
        reference_prefix: &str,
    ) -> Result<Option<(User, Participant)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_query = format!(
            "INSERT INTO users (email, display_name, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&user_query)
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .fetch_one(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO participants (user_id, full_name, phone, school, chapter, city, reference_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_participants_reference_code DO NOTHING
             RETURNING {COLUMNS}"
        );

        for attempt in 1..=reference::MAX_GENERATION_ATTEMPTS {
            let code = reference::generate(reference_prefix);
            let inserted = sqlx::query_as::<_, Participant>(&insert)
                .bind(user.id)
                .bind(&input.full_name)
                .bind(&input.phone)
                .bind(&input.school)
                .bind(&input.chapter)
                .bind(&input.city)
                .bind(&code)
                .fetch_optional(&mut *tx)
                .await?;

            if let Some(participant) = inserted {
                tx.commit().await?;
                return Ok(Some((user, participant)));
            }
            tracing::warn!(attempt, code = %code, "Reference code collision, retrying");
        }

        tx.rollback().await?;
        Ok(None)
    }

    /// Find a participant by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE id = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the registration record owned by a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE user_id = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a participant by (normalized) reference code.
    pub async fn find_by_reference(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE reference_code = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List participants with optional status filters and free-text search.
    pub async fn list(
        pool: &PgPool,
        params: &ParticipantListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParticipantSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM participants p
             JOIN users u ON u.id = p.user_id
             {LIST_FILTER}
             ORDER BY p.created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ParticipantSummary>(&query)
            .bind(&params.payment_status)
            .bind(&params.accreditation_status)
            .bind(&params.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count participants matching the same filters as [`Self::list`].
    pub async fn count(pool: &PgPool, params: &ParticipantListQuery) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)
             FROM participants p
             JOIN users u ON u.id = p.user_id
             {LIST_FILTER}"
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(&params.payment_status)
            .bind(&params.accreditation_status)
            .bind(&params.search)
            .fetch_one(pool)
            .await
    }

    /// Update profile fields. Only non-`None` fields in `input` are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateParticipant,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                school = COALESCE($4, school),
                chapter = COALESCE($5, chapter),
                city = COALESCE($6, city)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.school)
            .bind(&input.chapter)
            .bind(&input.city)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Payment
    // -----------------------------------------------------------------------

    /// Attach (or replace) a payment proof and move to `proof_submitted`.
    ///
    /// Returns `None` if the payment is already completed or the row is missing.
    pub async fn submit_payment_proof(
        pool: &PgPool,
        id: DbId,
        proof_url: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                payment_status = $3,
                payment_proof_url = $2,
                payment_submitted_at = NOW(),
                payment_note = NULL
             WHERE id = $1 AND payment_status IN ($4, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(proof_url)
            .bind(PaymentStatus::ProofSubmitted.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Mark the payment completed after admin review.
    pub async fn approve_payment(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        note: Option<&str>,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                payment_status = $2,
                payment_reviewed_at = NOW(),
                payment_reviewed_by = $3,
                payment_note = $4
             WHERE id = $1 AND payment_status IN ($5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(PaymentStatus::Completed.as_str())
            .bind(reviewer_id)
            .bind(note)
            .bind(PaymentStatus::Pending.as_str())
            .bind(PaymentStatus::ProofSubmitted.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Reject a submitted proof, returning the payment to `pending`.
    pub async fn reject_payment(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        reason: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                payment_status = $2,
                payment_reviewed_at = NOW(),
                payment_reviewed_by = $3,
                payment_note = $4
             WHERE id = $1 AND payment_status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(PaymentStatus::Pending.as_str())
            .bind(reviewer_id)
            .bind(reason)
            .bind(PaymentStatus::ProofSubmitted.as_str())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Accreditation
    // -----------------------------------------------------------------------

    /// Accredit a participant and record the accreditation scan atomically.
    ///
    /// The update only matches while accreditation is `pending` and payment
    /// is `completed`; otherwise nothing is written and `None` is returned.
    pub async fn accredit(
        pool: &PgPool,
        id: DbId,
        validator_id: DbId,
        note: Option<&str>,
    ) -> Result<Option<(Participant, Scan)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE participants SET
                accreditation_status = $2,
                accredited_at = NOW(),
                accredited_by = $3
             WHERE id = $1 AND accreditation_status = $4 AND payment_status = $5
             RETURNING {COLUMNS}"
        );
        let participant = sqlx::query_as::<_, Participant>(&update)
            .bind(id)
            .bind(AccreditationStatus::Completed.as_str())
            .bind(validator_id)
            .bind(AccreditationStatus::Pending.as_str())
            .bind(PaymentStatus::Completed.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(participant) = participant else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO scans (participant_id, validator_id, kind, note)
             VALUES ($1, $2, $3, $4)
             RETURNING {SCAN_COLUMNS}"
        );
        let scan = sqlx::query_as::<_, Scan>(&insert)
            .bind(participant.id)
            .bind(validator_id)
            .bind(ScanKind::Accreditation.as_str())
            .bind(note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((participant, scan)))
    }

    /// Decline accreditation. Same guard as [`Self::accredit`].
    pub async fn decline(
        pool: &PgPool,
        id: DbId,
        validator_id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                accreditation_status = $2,
                accredited_at = NOW(),
                accredited_by = $3
             WHERE id = $1 AND accreditation_status = $4 AND payment_status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(AccreditationStatus::Declined.as_str())
            .bind(validator_id)
            .bind(AccreditationStatus::Pending.as_str())
            .bind(PaymentStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Admin override to any accreditation status.
    ///
    /// Resetting to `pending` clears the accreditation stamp; any other
    /// target still requires a completed payment.
    pub async fn override_accreditation(
        pool: &PgPool,
        id: DbId,
        admin_id: DbId,
        target: AccreditationStatus,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                accreditation_status = $2::TEXT,
                accredited_at = CASE WHEN $2::TEXT = $4::TEXT THEN NULL ELSE NOW() END,
                accredited_by = CASE WHEN $2::TEXT = $4::TEXT THEN NULL ELSE $3 END
             WHERE id = $1 AND ($2::TEXT = $4::TEXT OR payment_status = $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(target.as_str())
            .bind(admin_id)
            .bind(AccreditationStatus::Pending.as_str())
            .bind(PaymentStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }
}
