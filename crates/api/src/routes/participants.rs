//! Route definitions for the `/participants` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::participants;
use crate::state::AppState;

/// Routes mounted at `/participants`.
///
/// ```text
/// GET  /                               -> list_participants (admin)
/// GET  /by-reference/{code}            -> get_by_reference (validator)
/// GET  /{id}                           -> get_participant (admin)
/// PUT  /{id}                           -> update_participant (admin)
/// POST /{id}/payment/approve           -> approve_payment (admin)
/// POST /{id}/payment/reject            -> reject_payment (admin)
/// PUT  /{id}/accreditation             -> override_accreditation (admin)
/// POST /{id}/accreditation/decline     -> decline_accreditation (validator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(participants::list_participants))
        .route(
            "/by-reference/{code}",
            get(participants::get_by_reference),
        )
        .route(
            "/{id}",
            get(participants::get_participant).put(participants::update_participant),
        )
        .route(
            "/{id}/payment/approve",
            post(participants::approve_payment),
        )
        .route("/{id}/payment/reject", post(participants::reject_payment))
        .route(
            "/{id}/accreditation",
            put(participants::override_accreditation),
        )
        .route(
            "/{id}/accreditation/decline",
            post(participants::decline_accreditation),
        )
}
