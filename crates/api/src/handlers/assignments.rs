//! Handlers for validator duty slots (`/assignments`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::roles::can_validate;
use confdesk_core::types::{DbId, Timestamp};
use confdesk_db::models::assignment::{Assignment, CreateAssignment, UpdateAssignment};
use confdesk_db::repositories::{AssignmentRepo, RoleRepo, UserRepo};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireValidator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /assignments`.
#[derive(Debug, Deserialize)]
pub struct AssignmentListParams {
    pub validator_id: Option<DbId>,
}

/// GET /api/v1/assignments
pub async fn list_assignments(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AssignmentListParams>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let items = AssignmentRepo::list(&state.pool, params.validator_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/assignments/{id}
pub async fn get_assignment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let assignment = find_assignment(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignment }))
}

/// POST /api/v1/assignments
pub async fn create_assignment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<Assignment>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }
    validate_window(input.starts_at, input.ends_at)?;
    ensure_validator(&state.pool, input.validator_id).await?;

    let assignment = AssignmentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        assignment_id = assignment.id,
        validator_id = assignment.validator_id,
        created_by = admin.user_id,
        "Assignment created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// PUT /api/v1/assignments/{id}
pub async fn update_assignment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssignment>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    if matches!(input.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }

    let current = find_assignment(&state.pool, id).await?;
    validate_window(
        input.starts_at.unwrap_or(current.starts_at),
        input.ends_at.unwrap_or(current.ends_at),
    )?;
    if let Some(validator_id) = input.validator_id {
        ensure_validator(&state.pool, validator_id).await?;
    }

    let assignment = AssignmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;
    Ok(Json(DataResponse { data: assignment }))
}

/// DELETE /api/v1/assignments/{id}
pub async fn delete_assignment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = AssignmentRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))
    }
}

/// GET /api/v1/me/assignments
pub async fn my_assignments(
    RequireValidator(user): RequireValidator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let items = AssignmentRepo::list(&state.pool, Some(user.user_id)).await?;
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_assignment(pool: &PgPool, id: DbId) -> AppResult<Assignment> {
    AssignmentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))
}

fn validate_window(starts_at: Timestamp, ends_at: Timestamp) -> AppResult<()> {
    if ends_at <= starts_at {
        return Err(AppError::Core(CoreError::Validation(
            "ends_at must be after starts_at".into(),
        )));
    }
    Ok(())
}

/// Duty slots can only go to active staff who may validate.
async fn ensure_validator(pool: &PgPool, user_id: DbId) -> AppResult<()> {
    let user = UserRepo::find_by_id(pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    let role = RoleRepo::resolve_name(pool, user.role_id).await?;
    if !user.is_active || !can_validate(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} is not an active validator"
        ))));
    }
    Ok(())
}
