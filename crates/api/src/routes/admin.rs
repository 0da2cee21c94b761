//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, maintenance};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                      -> list_users (?role)
/// POST   /users                      -> create_user
/// GET    /users/{id}                 -> get_user
/// PUT    /users/{id}                 -> update_user
/// DELETE /users/{id}                 -> deactivate_user
/// POST   /users/{id}/reset-password  -> reset_password
///
/// GET    /db/stats                   -> db_stats
/// POST   /db/vacuum                  -> vacuum
/// POST   /db/reindex                 -> reindex
/// POST   /db/kill-idle               -> kill_idle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/db/stats", get(maintenance::db_stats))
        .route("/db/vacuum", post(maintenance::vacuum))
        .route("/db/reindex", post(maintenance::reindex))
        .route("/db/kill-idle", post(maintenance::kill_idle))
}
