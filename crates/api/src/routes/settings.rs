//! Route definitions for the `/settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// `/public` is registered before `/{key}`; axum prefers the static
/// segment either way.
///
/// ```text
/// GET    /         -> list_settings (admin)
/// GET    /public   -> public_settings (no auth)
/// GET    /{key}    -> get_setting (admin)
/// PUT    /{key}    -> put_setting (admin)
/// DELETE /{key}    -> delete_setting (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::list_settings))
        .route("/public", get(settings::public_settings))
        .route(
            "/{key}",
            get(settings::get_setting)
                .put(settings::put_setting)
                .delete(settings::delete_setting),
        )
}
