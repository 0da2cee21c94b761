//! Handlers for participants: admin listing, profile edits, payment review
//! and accreditation decisions.
//!
//! Every transition is checked twice: first against the lifecycle rules in
//! `confdesk_core::lifecycle` (which produce the user-facing message), then
//! by the guarded `UPDATE` in the repository. A guard miss after a passing
//! pre-check means another request changed the row in between.

use axum::extract::{Path, Query, State};
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::{
    AccreditationAction, AccreditationStatus, PaymentAction, PaymentStatus,
};
use confdesk_core::reference;
use confdesk_core::scan::payload_for;
use confdesk_core::types::DbId;
use confdesk_db::models::participant::{
    Participant, ParticipantListQuery, ParticipantSummary, UpdateParticipant,
};
use confdesk_db::repositories::ParticipantRepo;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::dashboard;
use crate::middleware::rbac::{RequireAdmin, RequireParticipant, RequireValidator};
use crate::query::Page;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

/// Longest accepted payment proof reference (URL or object key).
const MAX_PROOF_URL_LEN: usize = 2048;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A participant as returned by the API, with the badge QR payload.
#[derive(Debug, Serialize)]
pub struct ParticipantView {
    #[serde(flatten)]
    pub participant: Participant,
    pub qr_payload: String,
}

impl From<Participant> for ParticipantView {
    fn from(participant: Participant) -> Self {
        let qr_payload = payload_for(&participant.reference_code);
        Self {
            participant,
            qr_payload,
        }
    }
}

/// Request body for `POST /me/payment-proof`.
#[derive(Debug, Deserialize)]
pub struct PaymentProofRequest {
    pub proof_url: String,
}

/// Request body for `POST /participants/{id}/payment/approve`.
#[derive(Debug, Default, Deserialize)]
pub struct ApprovePaymentRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for `POST /participants/{id}/payment/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectPaymentRequest {
    pub reason: String,
}

/// Request body for `PUT /participants/{id}/accreditation`.
#[derive(Debug, Deserialize)]
pub struct OverrideAccreditationRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Admin listing and profile
// ---------------------------------------------------------------------------

/// GET /api/v1/participants
///
/// Filters: `payment_status`, `accreditation_status`, `search`; paged.
pub async fn list_participants(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ParticipantListQuery>,
) -> AppResult<Json<PagedResponse<ParticipantSummary>>> {
    if let Some(status) = params.payment_status.as_deref() {
        PaymentStatus::parse(status)?;
    }
    if let Some(status) = params.accreditation_status.as_deref() {
        AccreditationStatus::parse(status)?;
    }

    let page = Page::clamp(params.limit, params.offset);

    let items = ParticipantRepo::list(&state.pool, &params, page.limit, page.offset).await?;
    let total = ParticipantRepo::count(&state.pool, &params).await?;

    Ok(Json(PagedResponse {
        data: items,
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /api/v1/participants/{id}
pub async fn get_participant(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let participant = find_participant(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// PUT /api/v1/participants/{id}
pub async fn update_participant(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateParticipant>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    validate_profile(&input)?;
    let participant = ParticipantRepo::update_profile(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// GET /api/v1/participants/by-reference/{code}
///
/// Used by validators when reconciling a bank transfer or keying in a badge.
pub async fn get_by_reference(
    RequireValidator(_user): RequireValidator,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let code = reference::parse(&code)?;
    let participant = find_by_reference(&state.pool, code).await?;
    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

// ---------------------------------------------------------------------------
// Own record
// ---------------------------------------------------------------------------

/// GET /api/v1/me/participant
pub async fn get_my_participant(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let participant = participant_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// PUT /api/v1/me/participant
pub async fn update_my_participant(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
    Json(input): Json<UpdateParticipant>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    validate_profile(&input)?;
    let current = participant_for_user(&state.pool, user.user_id).await?;
    let participant = ParticipantRepo::update_profile(&state.pool, current.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id: current.id,
        }))?;
    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// POST /api/v1/me/payment-proof
///
/// Record the location of an uploaded transfer receipt. Resubmitting
/// replaces the previous proof while the payment is still under review.
pub async fn submit_payment_proof(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
    Json(input): Json<PaymentProofRequest>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let proof_url = input.proof_url.trim();
    if proof_url.is_empty() || proof_url.len() > MAX_PROOF_URL_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "proof_url must be 1-{MAX_PROOF_URL_LEN} characters"
        ))));
    }

    let current = participant_for_user(&state.pool, user.user_id).await?;
    current.payment()?.apply(PaymentAction::SubmitProof)?;

    let participant = ParticipantRepo::submit_payment_proof(&state.pool, current.id, proof_url)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(participant_id = participant.id, "Payment proof submitted");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// POST /api/v1/participants/{id}/payment/approve
pub async fn approve_payment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApprovePaymentRequest>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let current = find_participant(&state.pool, id).await?;
    current.payment()?.apply(PaymentAction::Approve)?;

    let note = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let participant = ParticipantRepo::approve_payment(&state.pool, id, admin.user_id, note)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(
        participant_id = id,
        reviewer_id = admin.user_id,
        status = %participant.payment_status,
        "Payment approved"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// POST /api/v1/participants/{id}/payment/reject
///
/// Returns the payment to `pending` with the reason stored as the review note.
pub async fn reject_payment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RejectPaymentRequest>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A rejection reason is required".into(),
        )));
    }

    let current = find_participant(&state.pool, id).await?;
    current.payment()?.apply(PaymentAction::Reject)?;

    let participant = ParticipantRepo::reject_payment(&state.pool, id, admin.user_id, reason)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(participant_id = id, reviewer_id = admin.user_id, "Payment rejected");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

// ---------------------------------------------------------------------------
// Accreditation
// ---------------------------------------------------------------------------

/// POST /api/v1/participants/{id}/accreditation/decline
pub async fn decline_accreditation(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let current = find_participant(&state.pool, id).await?;
    current
        .accreditation()?
        .apply(AccreditationAction::Decline, current.payment()?)?;

    let participant = ParticipantRepo::decline(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(participant_id = id, validator_id = user.user_id, "Accreditation declined");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

/// PUT /api/v1/participants/{id}/accreditation
///
/// Admin override. Setting `pending` clears the accreditation stamps; any
/// other target still needs a completed payment.
pub async fn override_accreditation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<OverrideAccreditationRequest>,
) -> AppResult<Json<DataResponse<ParticipantView>>> {
    let target = AccreditationStatus::parse(input.status.trim())?;

    let current = find_participant(&state.pool, id).await?;
    current
        .accreditation()?
        .override_to(target, current.payment()?)?;

    let participant = ParticipantRepo::override_accreditation(&state.pool, id, admin.user_id, target)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(
        participant_id = id,
        admin_id = admin.user_id,
        status = target.as_str(),
        "Accreditation overridden"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: participant.into(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_participant(pool: &PgPool, id: DbId) -> AppResult<Participant> {
    ParticipantRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id,
        }))
}

/// Look up by an already-normalized reference code.
pub(crate) async fn find_by_reference(pool: &PgPool, code: String) -> AppResult<Participant> {
    ParticipantRepo::find_by_reference(pool, &code)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Participant",
            key: code,
        }))
}

/// The registration owned by the signed-in participant account.
pub(crate) async fn participant_for_user(pool: &PgPool, user_id: DbId) -> AppResult<Participant> {
    ParticipantRepo::find_by_user_id(pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Participant",
            key: format!("user {user_id}"),
        }))
}

fn concurrent_change() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Participant was modified by another request; reload and retry".into(),
    ))
}

fn validate_profile(input: &UpdateParticipant) -> AppResult<()> {
    let required = [("full_name", &input.full_name), ("school", &input.school)];
    for (field, value) in required {
        if let Some(v) = value {
            if v.trim().is_empty() || v.len() > 200 {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "{field} must be 1-200 characters"
                ))));
            }
        }
    }

    // Optional fields may be cleared but stay within the registration limits.
    let optional = [
        ("phone", &input.phone, 32),
        ("chapter", &input.chapter, 200),
        ("city", &input.city, 200),
    ];
    for (field, value, max) in optional {
        if value.as_ref().is_some_and(|v| v.len() > max) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{field} must be at most {max} characters"
            ))));
        }
    }
    Ok(())
}
