//! Repositories for the `resources` and `resource_accesses` tables.

use confdesk_core::scan::ScanKind;
use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::resource::{
    CreateResource, ParticipantResource, Resource, ResourceAccess, UpdateResource,
};
use crate::models::scan::Scan;
use crate::repositories::scan_repo::COLUMNS as SCAN_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, description, url, requires_accreditation, created_at, updated_at";

const ACCESS_COLUMNS: &str = "id, resource_id, participant_id, granted_by, granted_at";

/// Provides CRUD operations for resources.
pub struct ResourceRepo;

impl ResourceRepo {
    pub async fn create(pool: &PgPool, input: &CreateResource) -> Result<Resource, sqlx::Error> {
        let query = format!(
            "INSERT INTO resources (title, description, url, requires_accreditation)
             VALUES ($1, $2, $3, COALESCE($4, FALSE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(input.requires_accreditation)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resources WHERE id = $1");
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resources ORDER BY title");
        sqlx::query_as::<_, Resource>(&query).fetch_all(pool).await
    }

    /// Resources a participant may see, with the time they received each one.
    ///
    /// Accreditation-gated resources are only listed when `accredited` is true.
    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: DbId,
        accredited: bool,
    ) -> Result<Vec<ParticipantResource>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantResource>(
            "SELECT r.id, r.title, r.description, r.url, r.requires_accreditation, ra.granted_at
             FROM resources r
             LEFT JOIN resource_accesses ra
                    ON ra.resource_id = r.id AND ra.participant_id = $1
             WHERE $2 OR NOT r.requires_accreditation OR ra.id IS NOT NULL
             ORDER BY r.title",
        )
        .bind(participant_id)
        .bind(accredited)
        .fetch_all(pool)
        .await
    }

    /// Update a resource. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!(
            "UPDATE resources SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                url = COALESCE($4, url),
                requires_accreditation = COALESCE($5, requires_accreditation)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(input.requires_accreditation)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a resource and (by cascade) its access records.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Records which participant received which resource.
pub struct ResourceAccessRepo;

impl ResourceAccessRepo {
    /// Grant a resource and record the distribution scan in one transaction.
    ///
    /// A second grant of the same resource violates
    /// `uq_resource_accesses_resource_participant`.
    pub async fn grant(
        pool: &PgPool,
        resource_id: DbId,
        participant_id: DbId,
        granted_by: DbId,
    ) -> Result<(ResourceAccess, Scan), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO resource_accesses (resource_id, participant_id, granted_by)
             VALUES ($1, $2, $3)
             RETURNING {ACCESS_COLUMNS}"
        );
        let access = sqlx::query_as::<_, ResourceAccess>(&insert)
            .bind(resource_id)
            .bind(participant_id)
            .bind(granted_by)
            .fetch_one(&mut *tx)
            .await?;

        let scan_insert = format!(
            "INSERT INTO scans (participant_id, validator_id, kind, resource_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {SCAN_COLUMNS}"
        );
        let scan = sqlx::query_as::<_, Scan>(&scan_insert)
            .bind(participant_id)
            .bind(granted_by)
            .bind(ScanKind::Resource.as_str())
            .bind(resource_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((access, scan))
    }

    /// Everyone who received a resource, in grant order.
    pub async fn list_for_resource(
        pool: &PgPool,
        resource_id: DbId,
    ) -> Result<Vec<ResourceAccess>, sqlx::Error> {
        let query = format!(
            "SELECT {ACCESS_COLUMNS} FROM resource_accesses
             WHERE resource_id = $1
             ORDER BY granted_at, id"
        );
        sqlx::query_as::<_, ResourceAccess>(&query)
            .bind(resource_id)
            .fetch_all(pool)
            .await
    }
}
