//! In-process database monitoring counters.
//!
//! Every HTTP response is counted here, and those that ended in a database
//! failure are counted again, so the admin maintenance screen can show the
//! database failure rate and maintenance history without a metrics stack.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::DbPool;

/// Monotonic counters shared through `AppState`.
#[derive(Debug, Default)]
pub struct DbMonitor {
    requests_served: AtomicU64,
    db_failures: AtomicU64,
    maintenance_runs: AtomicU64,
    connections_killed: AtomicU64,
}

/// Point-in-time view of the counters plus pool occupancy.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub requests_served: u64,
    /// Requests that failed with a server-side database error.
    pub db_failures: u64,
    pub maintenance_runs: u64,
    pub connections_killed: u64,
    pub pool_size: u32,
    pub pool_idle: usize,
}

impl DbMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished request, and a database failure if it had one.
    pub fn record_request(&self, db_failed: bool) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        if db_failed {
            self.db_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_maintenance(&self) {
        self.maintenance_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_killed(&self, count: u64) {
        self.connections_killed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self, pool: &DbPool) -> MonitorSnapshot {
        MonitorSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            db_failures: self.db_failures.load(Ordering::Relaxed),
            maintenance_runs: self.maintenance_runs.load(Ordering::Relaxed),
            connections_killed: self.connections_killed.load(Ordering::Relaxed),
            pool_size: pool.size(),
            pool_idle: pool.num_idle(),
        }
    }
}
