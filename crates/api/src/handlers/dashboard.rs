//! Role-specific dashboard endpoints.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use confdesk_core::lifecycle::AccreditationStatus;
use confdesk_db::models::accommodation::Accommodation;
use confdesk_db::models::assignment::Assignment;
use confdesk_db::models::dashboard::{AdminOverview, ValidatorOverview};
use confdesk_db::models::resource::ParticipantResource;
use confdesk_db::models::scan::Scan;
use confdesk_db::repositories::{
    AccommodationRepo, AssignmentRepo, DashboardRepo, ResourceRepo, ScanRepo,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::participants::{self, ParticipantView};
use crate::middleware::rbac::{RequireAdmin, RequireParticipant, RequireValidator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Cache key for the admin overview.
pub const ADMIN_OVERVIEW_CACHE_KEY: &str = "dashboard:admin";

/// Response for `GET /dashboard/validator`.
#[derive(Debug, Serialize)]
pub struct ValidatorDashboard {
    pub overview: ValidatorOverview,
    pub assignments: Vec<Assignment>,
}

/// Response for `GET /dashboard/participant`.
#[derive(Debug, Serialize)]
pub struct ParticipantDashboard {
    pub participant: ParticipantView,
    pub bookings: Vec<Accommodation>,
    pub scans: Vec<Scan>,
    pub resources: Vec<ParticipantResource>,
}

/// GET /api/v1/dashboard/admin
///
/// Served from the cache for `DASHBOARD_CACHE_TTL_SECS`; state changes that
/// move the counters invalidate it.
pub async fn admin_dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AdminOverview>>> {
    if let Some(cached) = state
        .cache
        .get_json::<AdminOverview>(ADMIN_OVERVIEW_CACHE_KEY)
        .await
    {
        return Ok(Json(DataResponse { data: cached }));
    }

    let overview = DashboardRepo::admin_overview(&state.pool).await?;

    let ttl = Duration::from_secs(state.config.dashboard_cache_ttl_secs);
    if let Err(e) = state
        .cache
        .set_json(ADMIN_OVERVIEW_CACHE_KEY, &overview, ttl)
        .await
    {
        tracing::warn!(error = %e, "Failed to cache admin overview");
    }

    Ok(Json(DataResponse { data: overview }))
}

/// GET /api/v1/dashboard/validator
pub async fn validator_dashboard(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ValidatorDashboard>>> {
    let overview = DashboardRepo::validator_overview(&state.pool, user.user_id).await?;
    let assignments = AssignmentRepo::list(&state.pool, Some(user.user_id)).await?;
    Ok(Json(DataResponse {
        data: ValidatorDashboard {
            overview,
            assignments,
        },
    }))
}

/// GET /api/v1/dashboard/participant
pub async fn participant_dashboard(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ParticipantDashboard>>> {
    let participant = participants::participant_for_user(&state.pool, user.user_id).await?;

    let accredited = participant.accreditation()? == AccreditationStatus::Completed;
    let bookings = AccommodationRepo::list_for_participant(&state.pool, participant.id).await?;
    let scans = ScanRepo::list_for_participant(&state.pool, participant.id).await?;
    let resources =
        ResourceRepo::list_for_participant(&state.pool, participant.id, accredited).await?;

    Ok(Json(DataResponse {
        data: ParticipantDashboard {
            participant: ParticipantView::from(participant),
            bookings,
            scans,
            resources,
        },
    }))
}

/// Drop the cached admin overview after a change to the counted data.
pub(crate) async fn invalidate_admin_overview(state: &AppState) {
    state.cache.invalidate(ADMIN_OVERVIEW_CACHE_KEY).await;
}
