//! Database maintenance endpoints under `/admin/db`.
//!
//! Every operation is recorded in the [`DbMonitor`](confdesk_db::DbMonitor)
//! counters and logged with the acting admin.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use confdesk_core::maintenance::{
    validate_idle_threshold, validate_table, MaintenanceOp, MAINTAINABLE_TABLES,
};
use confdesk_core::types::DbId;
use confdesk_db::models::maintenance::{DatabaseStats, TableStats};
use confdesk_db::monitor::MonitorSnapshot;
use confdesk_db::repositories::MaintenanceRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response for `GET /admin/db/stats`.
#[derive(Debug, Serialize)]
pub struct DbStatsResponse {
    pub database: DatabaseStats,
    pub tables: Vec<TableStats>,
    pub monitor: MonitorSnapshot,
    /// `redis` or `memory`.
    pub cache_backend: &'static str,
}

/// Request body for `POST /admin/db/vacuum`.
#[derive(Debug, Deserialize)]
pub struct VacuumRequest {
    pub table: String,
    #[serde(default)]
    pub analyze: bool,
}

/// Request body for `POST /admin/db/reindex`.
#[derive(Debug, Deserialize)]
pub struct ReindexRequest {
    pub table: String,
}

/// Request body for `POST /admin/db/kill-idle`.
#[derive(Debug, Default, Deserialize)]
pub struct KillIdleRequest {
    /// Defaults to 600 seconds.
    pub older_than_secs: Option<i64>,
}

/// Outcome of a maintenance operation.
#[derive(Debug, Serialize)]
pub struct MaintenanceResult {
    pub operation: &'static str,
    pub table: Option<&'static str>,
    pub duration_ms: u64,
    /// Connections terminated (kill-idle only).
    pub affected: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/db/stats
pub async fn db_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DbStatsResponse>>> {
    let database = MaintenanceRepo::database_stats(&state.pool).await?;
    let tables = MaintenanceRepo::table_stats(&state.pool, MAINTAINABLE_TABLES).await?;

    Ok(Json(DataResponse {
        data: DbStatsResponse {
            database,
            tables,
            monitor: state.monitor.snapshot(&state.pool),
            cache_backend: state.cache.backend_name(),
        },
    }))
}

/// POST /api/v1/admin/db/vacuum
pub async fn vacuum(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<VacuumRequest>,
) -> AppResult<Json<DataResponse<MaintenanceResult>>> {
    let table = validate_table(input.table.trim())?;
    let op = if input.analyze {
        MaintenanceOp::VacuumAnalyze
    } else {
        MaintenanceOp::Vacuum
    };

    let started = Instant::now();
    MaintenanceRepo::vacuum(&state.pool, table, input.analyze).await?;
    let result = finish(&state, admin.user_id, op, Some(table), started, None);

    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/admin/db/reindex
pub async fn reindex(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ReindexRequest>,
) -> AppResult<Json<DataResponse<MaintenanceResult>>> {
    let table = validate_table(input.table.trim())?;

    let started = Instant::now();
    MaintenanceRepo::reindex(&state.pool, table).await?;
    let result = finish(
        &state,
        admin.user_id,
        MaintenanceOp::Reindex,
        Some(table),
        started,
        None,
    );

    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/admin/db/kill-idle
///
/// Terminate connections idle longer than `older_than_secs`. Connections
/// from this service's own pool are reopened on demand.
pub async fn kill_idle(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<KillIdleRequest>,
) -> AppResult<Json<DataResponse<MaintenanceResult>>> {
    let older_than_secs = validate_idle_threshold(input.older_than_secs)?;

    let started = Instant::now();
    let killed = MaintenanceRepo::kill_idle_connections(&state.pool, older_than_secs).await?;
    state.monitor.record_killed(killed);
    let result = finish(
        &state,
        admin.user_id,
        MaintenanceOp::KillIdle,
        None,
        started,
        Some(killed),
    );

    Ok(Json(DataResponse { data: result }))
}

fn finish(
    state: &AppState,
    admin_id: DbId,
    op: MaintenanceOp,
    table: Option<&'static str>,
    started: Instant,
    affected: Option<u64>,
) -> MaintenanceResult {
    let duration_ms = started.elapsed().as_millis() as u64;
    state.monitor.record_maintenance();
    tracing::info!(
        operation = op.as_str(),
        table = table.unwrap_or("-"),
        duration_ms,
        affected,
        admin_id,
        "Database maintenance completed"
    );
    MaintenanceResult {
        operation: op.as_str(),
        table,
        duration_ms,
        affected,
    }
}
