//! Scan (validator check) model and DTOs.

use confdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `scans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub participant_id: DbId,
    pub validator_id: Option<DbId>,
    pub kind: String,
    pub meal_slot: Option<String>,
    pub resource_id: Option<DbId>,
    pub note: Option<String>,
    pub scanned_at: Timestamp,
}

/// Scan joined with participant identity, for validator screens.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanWithParticipant {
    pub id: DbId,
    pub participant_id: DbId,
    pub full_name: String,
    pub reference_code: String,
    pub validator_id: Option<DbId>,
    pub kind: String,
    pub meal_slot: Option<String>,
    pub resource_id: Option<DbId>,
    pub note: Option<String>,
    pub scanned_at: Timestamp,
}

/// DTO for inserting a scan.
#[derive(Debug, Clone)]
pub struct CreateScan {
    pub participant_id: DbId,
    pub validator_id: DbId,
    pub kind: String,
    pub meal_slot: Option<String>,
    pub resource_id: Option<DbId>,
    pub note: Option<String>,
}

/// Filters for scan listings.
#[derive(Debug, Default, Deserialize)]
pub struct ScanListQuery {
    pub kind: Option<String>,
    pub meal_slot: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
