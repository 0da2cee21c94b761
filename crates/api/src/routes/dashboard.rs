//! Route definitions for `/dashboard`.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /admin        -> admin_dashboard (admin, cached)
/// GET /validator    -> validator_dashboard (validator)
/// GET /participant  -> participant_dashboard (participant)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::admin_dashboard))
        .route("/validator", get(dashboard::validator_dashboard))
        .route("/participant", get(dashboard::participant_dashboard))
}
