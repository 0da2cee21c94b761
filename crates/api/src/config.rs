use std::fmt::Display;
use std::str::FromStr;

use confdesk_core::reference;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A lone `*` allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres connection string.
    pub database_url: String,
    /// Upper bound on pooled database connections (default: `20`).
    pub db_max_connections: u32,
    /// Redis URL. When unset (or unreachable) the cache runs in memory.
    pub redis_url: Option<String>,
    /// Prefix for participant reference codes (default: `CONF`).
    pub reference_prefix: String,
    /// How often expired sessions are purged (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// Lifetime of cached dashboard figures (default: `30`).
    pub dashboard_cache_ttl_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `DATABASE_URL`                  | **required**            |
    /// | `DB_MAX_CONNECTIONS`            | `20`                    |
    /// | `REDIS_URL`                     | unset (in-memory cache) |
    /// | `REFERENCE_PREFIX`              | `CONF`                  |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    /// | `DASHBOARD_CACHE_TTL_SECS`      | `30`                    |
    ///
    /// # Panics
    ///
    /// Panics on a missing `DATABASE_URL`, an unparsable number, a zero
    /// timeout or cleanup interval, or an invalid reference prefix.
    /// Misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let reference_prefix = env_or("REFERENCE_PREFIX", reference::DEFAULT_PREFIX.to_string());
        if let Err(e) = reference::validate_prefix(&reference_prefix) {
            panic!("REFERENCE_PREFIX is invalid: {e}");
        }

        let host = env_or("HOST", "0.0.0.0".to_string());
        let port = env_or("PORT", 3000u16);
        let cors_origins = split_list(&env_or(
            "CORS_ORIGINS",
            "http://localhost:5173".to_string(),
        ));
        let request_timeout_secs = nonzero_secs("REQUEST_TIMEOUT_SECS", 30);
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db_max_connections = env_or("DB_MAX_CONNECTIONS", confdesk_db::DEFAULT_MAX_CONNECTIONS);
        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let session_cleanup_interval_secs = nonzero_secs("SESSION_CLEANUP_INTERVAL_SECS", 3600);
        let dashboard_cache_ttl_secs = env_or("DASHBOARD_CACHE_TTL_SECS", 30u64);
        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            redis_url,
            reference_prefix,
            session_cleanup_interval_secs,
            dashboard_cache_ttl_secs,
            jwt,
        }
    }
}

/// Read `name`, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse as `T`.
pub(crate) fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid ({raw:?}): {e}")),
        Err(_) => default,
    }
}

/// A duration in seconds that must not be zero: a zero timer interval
/// panics inside its task, and a zero timeout rejects every request.
fn nonzero_secs(name: &str, default: u64) -> u64 {
    ensure_nonzero(name, env_or(name, default)).unwrap_or_else(|e| panic!("{e}"))
}

fn ensure_nonzero(name: &str, secs: u64) -> Result<u64, String> {
    if secs == 0 {
        return Err(format!("{name} must be greater than 0"));
    }
    Ok(secs)
}

/// Comma-separated list with blanks dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
