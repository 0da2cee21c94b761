//! Handlers for the `/settings` key-value store.
//!
//! Admins manage every key; the `/settings/public` subset is readable
//! without a token and is served from the cache.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use confdesk_core::error::CoreError;
use confdesk_core::settings::{self, KEY_MEAL_SLOTS, KEY_REGISTRATION_OPEN, PUBLIC_KEYS};
use confdesk_db::models::setting::Setting;
use confdesk_db::repositories::SettingRepo;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Cache key for the public settings map.
pub const PUBLIC_SETTINGS_CACHE_KEY: &str = "settings:public";

/// Public settings change rarely; a short TTL bounds staleness across replicas.
const PUBLIC_SETTINGS_TTL: Duration = Duration::from_secs(300);

/// Request body for `PUT /settings/{key}`.
#[derive(Debug, Deserialize)]
pub struct PutSettingRequest {
    pub value: String,
}

/// GET /api/v1/settings
pub async fn list_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Setting>>>> {
    let items = SettingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/settings/public
///
/// Unauthenticated. Returns a `{ key: value }` map of the public keys.
pub async fn public_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BTreeMap<String, String>>>> {
    if let Some(cached) = state
        .cache
        .get_json::<BTreeMap<String, String>>(PUBLIC_SETTINGS_CACHE_KEY)
        .await
    {
        return Ok(Json(DataResponse { data: cached }));
    }

    let map: BTreeMap<String, String> = SettingRepo::list_keys(&state.pool, PUBLIC_KEYS)
        .await?
        .into_iter()
        .map(|s| (s.key, s.value))
        .collect();

    if let Err(e) = state
        .cache
        .set_json(PUBLIC_SETTINGS_CACHE_KEY, &map, PUBLIC_SETTINGS_TTL)
        .await
    {
        tracing::warn!(error = %e, "Failed to cache public settings");
    }

    Ok(Json(DataResponse { data: map }))
}

/// GET /api/v1/settings/{key}
pub async fn get_setting(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<Setting>>> {
    settings::validate_key(&key)?;
    let setting = SettingRepo::get(&state.pool, &key)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Setting",
            key,
        }))?;
    Ok(Json(DataResponse { data: setting }))
}

/// PUT /api/v1/settings/{key}
///
/// Creates the key when missing. Values of known keys are type-checked.
pub async fn put_setting(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<PutSettingRequest>,
) -> AppResult<Json<DataResponse<Setting>>> {
    settings::validate_key(&key)?;
    let value = input.value.trim();
    settings::validate_value(&key, value)?;

    let setting = SettingRepo::upsert(&state.pool, &key, value, admin.user_id).await?;
    tracing::info!(key = %setting.key, user_id = admin.user_id, "Setting updated");

    if settings::is_public(&key) {
        state.cache.invalidate(PUBLIC_SETTINGS_CACHE_KEY).await;
    }

    Ok(Json(DataResponse { data: setting }))
}

/// DELETE /api/v1/settings/{key}
pub async fn delete_setting(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    settings::validate_key(&key)?;
    let deleted = SettingRepo::delete(&state.pool, &key).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Setting",
            key,
        }));
    }
    tracing::info!(key = %key, user_id = admin.user_id, "Setting deleted");

    if settings::is_public(&key) {
        state.cache.invalidate(PUBLIC_SETTINGS_CACHE_KEY).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Lookups used by other handlers
// ---------------------------------------------------------------------------

/// Whether self-registration is accepted. A missing key means open.
pub(crate) async fn registration_open(pool: &PgPool) -> AppResult<bool> {
    match SettingRepo::get_value(pool, KEY_REGISTRATION_OPEN).await? {
        Some(value) => settings::parse_bool(&value).map_err(|e| {
            AppError::InternalError(format!("Stored registration_open is invalid: {e}"))
        }),
        None => Ok(true),
    }
}

/// Configured meal slots; empty when the key is unset.
pub(crate) async fn meal_slots(pool: &PgPool) -> AppResult<Vec<String>> {
    Ok(SettingRepo::get_value(pool, KEY_MEAL_SLOTS)
        .await?
        .map(|v| settings::parse_list(&v))
        .unwrap_or_default())
}
