//! Aggregate rows for dashboards.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `(status, count)` pair from a `GROUP BY status` query.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Admin overview numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_participants: i64,
    pub payment: Vec<StatusCount>,
    pub accreditation: Vec<StatusCount>,
    pub bookings: Vec<StatusCount>,
    pub scans_today: i64,
    pub meals_served_today: i64,
    pub validators: i64,
}

/// Numbers shown to a validator about their own activity.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorOverview {
    pub scans_today: i64,
    pub scans_total: i64,
    pub accreditations_total: i64,
}
