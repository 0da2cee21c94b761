//! Repository for the `assignments` table (validator duty slots).

use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{Assignment, CreateAssignment, UpdateAssignment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, validator_id, title, location, starts_at, ends_at, notes, created_at, updated_at";

/// Provides CRUD operations for validator assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssignment,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO assignments (validator_id, title, location, starts_at, ends_at, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(input.validator_id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assignments in start order, optionally for a single validator.
    pub async fn list(
        pool: &PgPool,
        validator_id: Option<DbId>,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments
             WHERE ($1::BIGINT IS NULL OR validator_id = $1)
             ORDER BY starts_at, id"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(validator_id)
            .fetch_all(pool)
            .await
    }

    /// Update an assignment. Only non-`None` fields in `input` are applied.
    ///
    /// The `ck_assignments_window` constraint rejects an update that would
    /// leave `ends_at <= starts_at`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAssignment,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments SET
                validator_id = COALESCE($2, validator_id),
                title = COALESCE($3, title),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                notes = COALESCE($7, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(input.validator_id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete an assignment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
