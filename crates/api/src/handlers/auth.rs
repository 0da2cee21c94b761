//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use confdesk_core::error::CoreError;
use confdesk_core::roles::PARTICIPANT_ROLE_ID;
use confdesk_core::types::DbId;
use confdesk_db::models::participant::CreateParticipant;
use confdesk_db::models::session::NewSession;
use confdesk_db::models::user::{Account, CreateUser, User};
use confdesk_db::repositories::{ParticipantRepo, RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::participants::ParticipantView;
use crate::handlers::{dashboard, settings};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Wrong passwords in a row before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;
const LOCK_DURATION_MINS: i64 = 15;

/// Longest `User-Agent` kept on a session.
const MAX_USER_AGENT_LEN: usize = 256;

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub school: String,
    #[validate(length(max = 200))]
    pub chapter: Option<String>,
    #[validate(length(max = 200))]
    pub city: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login, refresh and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// Response for `POST /auth/register`: tokens plus the new registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub auth: AuthResponse,
    pub participant: ParticipantView,
}

/// POST /api/v1/auth/register
///
/// Participant self-registration. Creates the account and the registration
/// record (with its reference code) together and signs the user in.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    if !settings::registration_open(&state.pool).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Registration is closed".into(),
        )));
    }

    input.validate()?;
    validate_password_strength(&input.password)?;

    let email = normalize_email(&input.email);
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user_input = CreateUser {
        email,
        display_name: input.full_name.trim().to_string(),
        password_hash,
        role_id: PARTICIPANT_ROLE_ID,
    };
    let participant_input = CreateParticipant {
        full_name: input.full_name.trim().to_string(),
        phone: input.phone,
        school: input.school.trim().to_string(),
        chapter: input.chapter,
        city: input.city,
    };

    let (user, participant) = ParticipantRepo::register(
        &state.pool,
        &user_input,
        &participant_input,
        &state.config.reference_prefix,
    )
    .await?
    .ok_or_else(|| AppError::InternalError("Could not allocate a reference code".into()))?;

    tracing::info!(
        user_id = user.id,
        participant_id = participant.id,
        reference_code = %participant.reference_code,
        "Participant registered"
    );
    dashboard::invalidate_admin_overview(&state).await;

    let auth = issue_tokens(&state, &user, &headers).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse {
            auth,
            participant: participant.into(),
        })))
}

/// POST /api/v1/auth/login
///
/// Email and password sign-in. Five wrong passwords in a row lock the
/// account for fifteen minutes.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let Some(user) = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email)).await?
    else {
        return Err(invalid());
    };
    ensure_can_sign_in(&user)?;

    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_ok {
        record_failed_attempt(&state, &user).await?;
        return Err(invalid());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User signed in");

    Ok(Json(issue_tokens(&state, &user, &headers).await?))
}

/// POST /api/v1/auth/refresh
///
/// Trade a refresh token for a fresh pair. The presented token is spent
/// whether or not the account may still sign in.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user_id = SessionRepo::consume(&state.pool, &hash_refresh_token(&input.refresh_token))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    Ok(Json(issue_tokens(&state, &user, &headers).await?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Account>>> {
    let account = UserRepo::find_account(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(DataResponse { data: account }))
}

/// Emails are compared case-insensitively by storing them lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Deactivated and currently locked accounts are refused before the
/// password is even checked.
fn ensure_can_sign_in(user: &User) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }
    Ok(())
}

async fn record_failed_attempt(state: &AppState, user: &User) -> AppResult<()> {
    let until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
    let attempts =
        UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, until).await?;
    if attempts >= MAX_FAILED_ATTEMPTS {
        tracing::warn!(user_id = user.id, %until, "Account locked after repeated failed logins");
    }
    Ok(())
}

/// Client details recorded on the session: user agent and originating IP.
///
/// Behind a proxy the first `X-Forwarded-For` hop is the client.
fn client_details(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let user_agent = header(USER_AGENT.as_str())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect::<String>());
    let ip_address = header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .or_else(|| header("x-real-ip"))
        .map(str::to_string);

    (user_agent, ip_address)
}

/// Sign an access token, open a refresh session and build the response.
async fn issue_tokens(state: &AppState, user: &User, headers: &HeaderMap) -> AppResult<AuthResponse> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let jwt = &state.config.jwt;

    let access_token = generate_access_token(user.id, &role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, refresh_token_hash) = generate_refresh_token();
    let (user_agent, ip_address) = client_details(headers);
    SessionRepo::create(
        &state.pool,
        &NewSession {
            user_id: user.id,
            refresh_token_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent,
            ip_address,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_expiry_secs(),
        user: UserInfo {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role,
        },
    })
}
