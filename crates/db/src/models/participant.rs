//! Participant (registration record) model and DTOs.

use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::{AccreditationStatus, PaymentStatus};
use confdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: DbId,
    pub user_id: DbId,
    pub full_name: String,
    pub phone: Option<String>,
    pub school: String,
    pub chapter: Option<String>,
    pub city: Option<String>,
    pub reference_code: String,
    pub payment_status: String,
    pub payment_proof_url: Option<String>,
    pub payment_submitted_at: Option<Timestamp>,
    pub payment_reviewed_at: Option<Timestamp>,
    pub payment_reviewed_by: Option<DbId>,
    pub payment_note: Option<String>,
    pub accreditation_status: String,
    pub accredited_at: Option<Timestamp>,
    pub accredited_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Participant {
    /// Parsed payment status. The column is CHECK-constrained, so a parse
    /// failure means the schema and code have drifted.
    pub fn payment(&self) -> Result<PaymentStatus, CoreError> {
        PaymentStatus::parse(&self.payment_status)
    }

    pub fn accreditation(&self) -> Result<AccreditationStatus, CoreError> {
        AccreditationStatus::parse(&self.accreditation_status)
    }
}

/// Participant joined with the owning user's email, for admin listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantSummary {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub full_name: String,
    pub school: String,
    pub chapter: Option<String>,
    pub reference_code: String,
    pub payment_status: String,
    pub accreditation_status: String,
    pub created_at: Timestamp,
}

/// DTO for creating a participant row (user id is supplied by the caller).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateParticipant {
    pub full_name: String,
    pub phone: Option<String>,
    pub school: String,
    pub chapter: Option<String>,
    pub city: Option<String>,
}

/// DTO for updating profile fields. Status fields are never patched here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateParticipant {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub school: Option<String>,
    pub chapter: Option<String>,
    pub city: Option<String>,
}

/// Filters for the admin participant listing.
#[derive(Debug, Default, Deserialize)]
pub struct ParticipantListQuery {
    pub payment_status: Option<String>,
    pub accreditation_status: Option<String>,
    /// Case-insensitive match on name, email, school, or reference code.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
