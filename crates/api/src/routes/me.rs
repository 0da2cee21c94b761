//! Route definitions for `/me`, the signed-in user's own records.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{assignments, bookings, participants, resources, scans};
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET  /participant    -> get_my_participant (participant)
/// PUT  /participant    -> update_my_participant (participant)
/// POST /payment-proof  -> submit_payment_proof (participant)
/// GET  /scans          -> list_my_scans (participant)
/// GET  /bookings       -> list_my_bookings (participant)
/// GET  /resources      -> list_my_resources (participant)
/// GET  /assignments    -> my_assignments (validator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/participant",
            get(participants::get_my_participant).put(participants::update_my_participant),
        )
        .route("/payment-proof", post(participants::submit_payment_proof))
        .route("/scans", get(scans::list_my_scans))
        .route("/bookings", get(bookings::list_my_bookings))
        .route("/resources", get(resources::list_my_resources))
        .route("/assignments", get(assignments::my_assignments))
}
