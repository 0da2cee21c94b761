//! QR scan workflow: accreditation at the front desk, meal validation at
//! the serving line, and scan history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::{AccreditationAction, AccreditationStatus};
use confdesk_core::scan::{self, ScanKind};
use confdesk_db::models::scan::{Scan, ScanListQuery, ScanWithParticipant};
use confdesk_db::repositories::{ParticipantRepo, ScanRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::participants::{self, ParticipantView};
use crate::handlers::{dashboard, settings};
use crate::middleware::rbac::{RequireParticipant, RequireValidator};
use crate::query::Page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /scans/accreditation`.
#[derive(Debug, Deserialize)]
pub struct AccreditationScanRequest {
    /// Raw QR payload or a typed reference code.
    pub payload: String,
    pub note: Option<String>,
}

/// Request body for `POST /scans/meal`.
#[derive(Debug, Deserialize)]
pub struct MealScanRequest {
    pub payload: String,
    pub meal_slot: String,
    pub note: Option<String>,
}

/// Result of a successful scan: who was scanned and the recorded check.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub participant: ParticipantView,
    pub scan: Scan,
}

/// POST /api/v1/scans/accreditation
///
/// Accredit the participant whose badge was scanned. Payment must be
/// completed; a second scan of the same badge is a 409.
pub async fn accreditation_scan(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
    Json(input): Json<AccreditationScanRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ScanResponse>>)> {
    let code = scan::parse_payload(&input.payload)?;
    let current = participants::find_by_reference(&state.pool, code).await?;
    current
        .accreditation()?
        .apply(AccreditationAction::Accredit, current.payment()?)?;

    let note = clean_note(input.note.as_deref());
    let (participant, scan) = ParticipantRepo::accredit(&state.pool, current.id, user.user_id, note)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Participant was modified by another request; scan again".into(),
            ))
        })?;

    tracing::info!(
        participant_id = participant.id,
        validator_id = user.user_id,
        scan_id = scan.id,
        "Participant accredited"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScanResponse {
                participant: participant.into(),
                scan,
            },
        }),
    ))
}

/// POST /api/v1/scans/meal
///
/// Serve `meal_slot` to an accredited participant, at most once per slot.
pub async fn meal_scan(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
    Json(input): Json<MealScanRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ScanResponse>>)> {
    let meal_slot = input.meal_slot.trim().to_ascii_lowercase();
    let configured = settings::meal_slots(&state.pool).await?;
    scan::ensure_meal_slot_configured(&meal_slot, &configured)?;

    let code = scan::parse_payload(&input.payload)?;
    let participant = participants::find_by_reference(&state.pool, code).await?;

    if participant.accreditation()? != AccreditationStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Participant is not accredited".into(),
        )));
    }

    if ScanRepo::meal_served(&state.pool, participant.id, &meal_slot).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Meal '{meal_slot}' already served to this participant"
        ))));
    }

    // The unique index still rejects a concurrent duplicate.
    let note = clean_note(input.note.as_deref());
    let scan = ScanRepo::record_meal(&state.pool, participant.id, user.user_id, &meal_slot, note)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Participant is not accredited".into(),
            ))
        })?;

    tracing::info!(
        participant_id = participant.id,
        validator_id = user.user_id,
        meal_slot = %meal_slot,
        "Meal served"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScanResponse {
                participant: participant.into(),
                scan,
            },
        }),
    ))
}

/// GET /api/v1/scans
///
/// Validators see their own scans; admins see everyone's.
pub async fn list_scans(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
    Query(params): Query<ScanListQuery>,
) -> AppResult<Json<DataResponse<Vec<ScanWithParticipant>>>> {
    if let Some(kind) = params.kind.as_deref() {
        ScanKind::parse(kind)?;
    }
    if let Some(slot) = params.meal_slot.as_deref() {
        scan::validate_meal_slot(slot)?;
    }

    let page = Page::clamp(params.limit, params.offset);
    let validator_id = (!user.is_admin()).then_some(user.user_id);

    let items =
        ScanRepo::list(&state.pool, validator_id, &params, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/me/scans
pub async fn list_my_scans(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Scan>>>> {
    let participant = participants::participant_for_user(&state.pool, user.user_id).await?;
    let items = ScanRepo::list_for_participant(&state.pool, participant.id).await?;
    Ok(Json(DataResponse { data: items }))
}

fn clean_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}
