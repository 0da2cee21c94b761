//! Rows returned by database maintenance / monitoring queries.

use confdesk_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Database-wide figures from `pg_database_size` and `pg_stat_activity`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DatabaseStats {
    pub database_name: String,
    pub size_bytes: i64,
    pub total_connections: i64,
    pub active_connections: i64,
    pub idle_connections: i64,
    pub idle_in_transaction: i64,
}

/// Per-table figures from `pg_stat_user_tables`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableStats {
    pub table_name: String,
    pub live_rows: i64,
    pub dead_rows: i64,
    pub total_size_bytes: i64,
    pub last_vacuum: Option<Timestamp>,
    pub last_autovacuum: Option<Timestamp>,
    pub last_analyze: Option<Timestamp>,
}
