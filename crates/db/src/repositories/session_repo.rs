//! Refresh sessions in `user_sessions`.
//!
//! A session is live while `is_revoked` is false and `expires_at` is in the
//! future. Rotation spends the presented token in a single `UPDATE`, so two
//! concurrent refreshes with the same token cannot both succeed.

use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::NewSession;

pub struct SessionRepo;

impl SessionRepo {
    /// Store a new session and return its id.
    pub async fn create(pool: &PgPool, session: &NewSession) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO user_sessions \
                 (user_id, refresh_token_hash, expires_at, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(session.user_agent.as_deref())
        .bind(session.ip_address.as_deref())
        .fetch_one(pool)
        .await
    }

    /// Revoke the live session holding `token_hash` and return its owner.
    ///
    /// `None` means the token is unknown, expired or already spent.
    pub async fn consume(pool: &PgPool, token_hash: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE user_sessions SET is_revoked = true \
             WHERE refresh_token_hash = $1 AND NOT is_revoked AND expires_at > NOW() \
             RETURNING user_id",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Revoke every live session of a user (logout, deactivation, password
    /// reset). Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(done.rows_affected())
    }

    /// Number of live sessions a user holds.
    pub async fn count_live(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_sessions \
             WHERE user_id = $1 AND NOT is_revoked AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Purge spent and expired sessions. Returns the number deleted.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let done = sqlx::query("DELETE FROM user_sessions WHERE is_revoked OR expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(done.rows_affected())
    }
}
