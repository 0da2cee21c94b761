use std::sync::Arc;

use confdesk_cache::Cache;
use confdesk_db::DbMonitor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: confdesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Dashboard / settings cache (Redis or in-memory).
    pub cache: Cache,
    /// Query and maintenance counters shown on the admin database screen.
    pub monitor: Arc<DbMonitor>,
}
