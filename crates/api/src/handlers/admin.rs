//! Handlers for `/admin/users` (staff account management).
//!
//! Admins create validator and admin accounts here. Participant accounts
//! only come from self-registration, since each one needs a registration
//! record alongside it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::roles::{ROLE_ADMIN, ROLE_PARTICIPANT, ROLE_VALIDATOR};
use confdesk_core::types::DbId;
use confdesk_db::models::user::{Account, CreateUser, UserPatch};
use confdesk_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::normalize_email;
use crate::handlers::dashboard;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Role name filter (`admin`, `validator`, `participant`).
    pub role: Option<String>,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub display_name: String,
    pub password: String,
    /// `validator` or `admin`.
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<Account>>>> {
    if let Some(role) = params.role.as_deref() {
        if ![ROLE_ADMIN, ROLE_VALIDATOR, ROLE_PARTICIPANT].contains(&role) {
            return Err(unknown_role(role));
        }
    }
    let data = UserRepo::list_accounts(&state.pool, params.role.as_deref()).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Account>>)> {
    input.validate()?;
    validate_password_strength(&input.password)?;
    let role_id = staff_role_id(&state, &input.role).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: normalize_email(&input.email),
            display_name: input.display_name.trim().to_string(),
            password_hash,
            role_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = %input.role,
        created_by = admin.user_id,
        "Staff account created"
    );
    if input.role == ROLE_VALIDATOR {
        dashboard::invalidate_admin_overview(&state).await;
    }

    let account = load_account(&state, user.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: account })))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Account>>> {
    Ok(Json(DataResponse {
        data: load_account(&state, id).await?,
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Profile fields, role and active flag. Only staff accounts may change
/// role, and only between `validator` and `admin`.
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<Account>>> {
    input.validate()?;
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(self_deactivation());
    }

    let current = load_account(&state, id).await?;
    let role_id = match input.role.as_deref() {
        Some(_) if !is_staff(&current.role) => {
            return Err(AppError::Core(CoreError::Validation(
                "Participant accounts cannot change role".into(),
            )));
        }
        Some(name) => Some(staff_role_id(&state, name).await?),
        None => None,
    };

    let patch = UserPatch {
        email: input.email.as_deref().map(normalize_email),
        display_name: input.display_name.map(|n| n.trim().to_string()),
        role_id,
        is_active: input.is_active,
    };
    if !UserRepo::update(&state.pool, id, &patch).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }
    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(Json(DataResponse {
        data: load_account(&state, id).await?,
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate and sign the user out everywhere.
pub async fn deactivate_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(self_deactivation());
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, revoked, deactivated_by = admin.user_id, "User deactivated");
    dashboard::invalidate_admin_overview(&state).await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Also clears any lockout and signs the user out everywhere.
pub async fn reset_password(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password)?;
    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, reset_by = admin.user_id, "Password reset");

    Ok(StatusCode::NO_CONTENT)
}

async fn load_account(state: &AppState, id: DbId) -> AppResult<Account> {
    UserRepo::find_account(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_VALIDATOR
}

fn unknown_role(name: &str) -> AppError {
    AppError::Core(CoreError::Validation(format!("Unknown role '{name}'")))
}

fn self_deactivation() -> AppError {
    AppError::Core(CoreError::Validation(
        "You cannot deactivate your own account".into(),
    ))
}

/// Id of a staff role by name. Participant accounts only come from
/// self-registration.
async fn staff_role_id(state: &AppState, name: &str) -> AppResult<DbId> {
    if !is_staff(name) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role must be '{ROLE_VALIDATOR}' or '{ROLE_ADMIN}'"
        ))));
    }
    RoleRepo::list(&state.pool)
        .await?
        .into_iter()
        .find(|r| r.name == name)
        .map(|r| r.id)
        .ok_or_else(|| unknown_role(name))
}
