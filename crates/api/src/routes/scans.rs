//! Route definitions for the `/scans` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scans;
use crate::state::AppState;

/// Routes mounted at `/scans`. All require a validator or admin.
///
/// ```text
/// GET  /               -> list_scans
/// POST /accreditation  -> accreditation_scan
/// POST /meal           -> meal_scan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scans::list_scans))
        .route("/accreditation", post(scans::accreditation_scan))
        .route("/meal", post(scans::meal_scan))
}
