//! Database maintenance operations: table whitelist and input validation.
//!
//! Maintenance statements (`VACUUM`, `REINDEX`) cannot take bind
//! parameters for identifiers, so table names are only ever interpolated
//! after passing [`validate_table`].

use crate::error::CoreError;

/// Tables an admin may vacuum or reindex.
pub const MAINTAINABLE_TABLES: &[&str] = &[
    "users",
    "user_sessions",
    "participants",
    "scans",
    "assignments",
    "hotels",
    "accommodations",
    "resources",
    "resource_accesses",
    "settings",
];

/// Idle connections younger than this are never terminated.
pub const MIN_IDLE_THRESHOLD_SECS: i64 = 60;
/// Upper bound for the idle threshold (one day).
pub const MAX_IDLE_THRESHOLD_SECS: i64 = 86_400;
/// Default idle threshold when the request omits one.
pub const DEFAULT_IDLE_THRESHOLD_SECS: i64 = 600;

/// Maintenance operations, used for logging and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceOp {
    Vacuum,
    VacuumAnalyze,
    Reindex,
    KillIdle,
}

impl MaintenanceOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vacuum => "vacuum",
            Self::VacuumAnalyze => "vacuum_analyze",
            Self::Reindex => "reindex",
            Self::KillIdle => "kill_idle",
        }
    }
}

/// Reject any table not in [`MAINTAINABLE_TABLES`].
pub fn validate_table(name: &str) -> Result<&'static str, CoreError> {
    MAINTAINABLE_TABLES
        .iter()
        .copied()
        .find(|t| *t == name)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Table '{name}' is not maintainable. Valid tables: {}",
                MAINTAINABLE_TABLES.join(", ")
            ))
        })
}

/// Resolve and bound the idle-connection threshold.
pub fn validate_idle_threshold(secs: Option<i64>) -> Result<i64, CoreError> {
    let secs = secs.unwrap_or(DEFAULT_IDLE_THRESHOLD_SECS);
    if !(MIN_IDLE_THRESHOLD_SECS..=MAX_IDLE_THRESHOLD_SECS).contains(&secs) {
        return Err(CoreError::Validation(format!(
            "Idle threshold must be between {MIN_IDLE_THRESHOLD_SECS} and {MAX_IDLE_THRESHOLD_SECS} seconds"
        )));
    }
    Ok(secs)
}
