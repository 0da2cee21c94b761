//! Handlers for distributable resources (kits, materials, downloads).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::lifecycle::AccreditationStatus;
use confdesk_core::scan;
use confdesk_core::types::DbId;
use confdesk_db::models::resource::{
    CreateResource, ParticipantResource, Resource, ResourceAccess, UpdateResource,
};
use confdesk_db::models::scan::Scan;
use confdesk_db::repositories::{ResourceAccessRepo, ResourceRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::dashboard;
use crate::handlers::participants::{self, ParticipantView};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireParticipant, RequireValidator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Listing shape depends on who is asking.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResourceListing {
    /// Staff see the full catalogue.
    All(Vec<Resource>),
    /// Participants see what they are eligible for, with receipt times.
    Eligible(Vec<ParticipantResource>),
}

/// Request body for `POST /resources/{id}/distribute`.
#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    /// Badge QR payload or reference code of the recipient.
    pub payload: String,
}

/// Response for a distribution.
#[derive(Debug, Serialize)]
pub struct DistributeResponse {
    pub participant: ParticipantView,
    pub access: ResourceAccess,
    pub scan: Scan,
}

/// GET /api/v1/resources
pub async fn list_resources(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ResourceListing>>> {
    let listing = if user.is_participant() {
        ResourceListing::Eligible(participant_resources(&state.pool, user.user_id).await?)
    } else {
        ResourceListing::All(ResourceRepo::list(&state.pool).await?)
    };
    Ok(Json(DataResponse { data: listing }))
}

/// GET /api/v1/resources/{id}
pub async fn get_resource(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Resource>>> {
    let resource = find_resource(&state.pool, id).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// POST /api/v1/resources
pub async fn create_resource(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<DataResponse<Resource>>)> {
    input.title = input.title.trim().to_string();
    if input.title.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }

    let resource = ResourceRepo::create(&state.pool, &input).await?;
    tracing::info!(resource_id = resource.id, title = %resource.title, "Resource created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: resource })))
}

/// PUT /api/v1/resources/{id}
pub async fn update_resource(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateResource>,
) -> AppResult<Json<DataResponse<Resource>>> {
    if matches!(input.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }
    let resource = ResourceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Resource",
            id,
        }))?;
    Ok(Json(DataResponse { data: resource }))
}

/// DELETE /api/v1/resources/{id}
///
/// Hard delete; distribution records go with it.
pub async fn delete_resource(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ResourceRepo::delete(&state.pool, id).await? {
        tracing::info!(resource_id = id, "Resource deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Resource",
            id,
        }))
    }
}

/// POST /api/v1/resources/{id}/distribute
///
/// Record that the scanned participant received the resource. Each
/// participant receives a resource at most once.
pub async fn distribute_resource(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DistributeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DistributeResponse>>)> {
    let resource = find_resource(&state.pool, id).await?;
    let code = scan::parse_payload(&input.payload)?;
    let participant = participants::find_by_reference(&state.pool, code).await?;

    if resource.requires_accreditation
        && participant.accreditation()? != AccreditationStatus::Completed
    {
        return Err(AppError::Core(CoreError::Conflict(
            "This resource is only given to accredited participants".into(),
        )));
    }

    let (access, scan) =
        ResourceAccessRepo::grant(&state.pool, resource.id, participant.id, user.user_id).await?;

    tracing::info!(
        resource_id = resource.id,
        participant_id = participant.id,
        validator_id = user.user_id,
        "Resource distributed"
    );
    dashboard::invalidate_admin_overview(&state).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DistributeResponse {
                participant: participant.into(),
                access,
                scan,
            },
        }),
    ))
}

/// GET /api/v1/resources/{id}/recipients
pub async fn list_recipients(
    RequireValidator(_user): RequireValidator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ResourceAccess>>>> {
    find_resource(&state.pool, id).await?;
    let items = ResourceAccessRepo::list_for_resource(&state.pool, id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/me/resources
pub async fn list_my_resources(
    RequireParticipant(user): RequireParticipant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ParticipantResource>>>> {
    let items = participant_resources(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_resource(pool: &PgPool, id: DbId) -> AppResult<Resource> {
    ResourceRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Resource",
            id,
        }))
}

async fn participant_resources(
    pool: &PgPool,
    user_id: DbId,
) -> AppResult<Vec<ParticipantResource>> {
    let participant = participants::participant_for_user(pool, user_id).await?;
    let accredited = participant.accreditation()? == AccreditationStatus::Completed;
    Ok(ResourceRepo::list_for_participant(pool, participant.id, accredited).await?)
}
