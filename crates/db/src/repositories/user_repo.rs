//! Accounts and sign-in bookkeeping.

use confdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{Account, CreateUser, User, UserPatch};

pub(crate) const COLUMNS: &str = "id, email, display_name, password_hash, role_id, is_active, \
    last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// [`Account`] columns over `users u JOIN roles r`.
const ACCOUNT_SELECT: &str = "SELECT u.id, u.email, u.display_name, r.name AS role, u.role_id, \
    u.is_active, u.last_login_at, u.created_at \
    FROM users u JOIN roles r ON r.id = u.role_id";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (email, display_name, password_hash, role_id) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
    }

    /// Exact match; the API stores emails lower-cased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as(&sql).bind(email).fetch_optional(pool).await
    }

    pub async fn find_account(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!("{ACCOUNT_SELECT} WHERE u.id = $1");
        sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
    }

    /// Accounts, newest first, optionally only those holding `role`.
    pub async fn list_accounts(
        pool: &PgPool,
        role: Option<&str>,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let sql = format!(
            "{ACCOUNT_SELECT} WHERE ($1::TEXT IS NULL OR r.name = $1) \
             ORDER BY u.created_at DESC, u.id DESC"
        );
        sqlx::query_as(&sql).bind(role).fetch_all(pool).await
    }

    /// Apply `patch`; `false` when no such user exists.
    pub async fn update(pool: &PgPool, id: DbId, patch: &UserPatch) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 display_name = COALESCE($3, display_name), \
                 role_id = COALESCE($4, role_id), \
                 is_active = COALESCE($5, is_active) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.email.as_deref())
        .bind(patch.display_name.as_deref())
        .bind(patch.role_id)
        .bind(patch.is_active)
        .execute(pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    /// `false` when the user is missing or already inactive.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let done = sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(done.rows_affected() == 1)
    }

    /// Count a wrong password and lock the account until `lock_until` once
    /// the count reaches `max_attempts`. Counting restarts after a lock has
    /// run out. Returns the new count.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_until: Timestamp,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "WITH next AS ( \
                 SELECT id, CASE WHEN locked_until IS NOT NULL AND locked_until <= NOW() \
                                 THEN 1 ELSE failed_login_count + 1 END AS attempts \
                 FROM users WHERE id = $1 \
             ) \
             UPDATE users u SET \
                 failed_login_count = next.attempts, \
                 locked_until = CASE WHEN next.attempts >= $2 THEN $3 \
                                     WHEN u.locked_until <= NOW() THEN NULL \
                                     ELSE u.locked_until END \
             FROM next WHERE u.id = next.id \
             RETURNING u.failed_login_count",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_one(pool)
        .await
    }

    /// Clear the failure count and any lock, and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// `false` when no such user exists.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }
}
