//! Route definitions for the `/resources` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::resources;
use crate::state::AppState;

/// Routes mounted at `/resources`.
///
/// ```text
/// GET    /                 -> list_resources (staff: all; participant: eligible)
/// POST   /                 -> create_resource (admin)
/// GET    /{id}             -> get_resource
/// PUT    /{id}             -> update_resource (admin)
/// DELETE /{id}             -> delete_resource (admin)
/// POST   /{id}/distribute  -> distribute_resource (validator)
/// GET    /{id}/recipients  -> list_recipients (validator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            "/{id}",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route("/{id}/distribute", post(resources::distribute_resource))
        .route("/{id}/recipients", get(resources::list_recipients))
}
