//! Aggregate queries backing the role dashboards.

use confdesk_core::roles::ROLE_VALIDATOR;
use confdesk_core::scan::ScanKind;
use confdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{AdminOverview, StatusCount, ValidatorOverview};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Event-wide counts for the admin dashboard.
    pub async fn admin_overview(pool: &PgPool) -> Result<AdminOverview, sqlx::Error> {
        let total_participants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
            .fetch_one(pool)
            .await?;

        let payment = Self::status_counts(pool, "participants", "payment_status").await?;
        let accreditation =
            Self::status_counts(pool, "participants", "accreditation_status").await?;
        let bookings = Self::status_counts(pool, "accommodations", "status").await?;

        let (scans_today, meals_served_today): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE kind = $1)
             FROM scans
             WHERE scanned_at >= date_trunc('day', NOW())",
        )
        .bind(ScanKind::Meal.as_str())
        .fetch_one(pool)
        .await?;

        let validators: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users u
             JOIN roles r ON r.id = u.role_id
             WHERE r.name = $1 AND u.is_active",
        )
        .bind(ROLE_VALIDATOR)
        .fetch_one(pool)
        .await?;

        Ok(AdminOverview {
            total_participants,
            payment,
            accreditation,
            bookings,
            scans_today,
            meals_served_today,
            validators,
        })
    }

    /// A validator's own scan activity.
    pub async fn validator_overview(
        pool: &PgPool,
        validator_id: DbId,
    ) -> Result<ValidatorOverview, sqlx::Error> {
        let (scans_today, scans_total, accreditations_total): (i64, i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE scanned_at >= date_trunc('day', NOW())),
                COUNT(*),
                COUNT(*) FILTER (WHERE kind = $2)
             FROM scans
             WHERE validator_id = $1",
        )
        .bind(validator_id)
        .bind(ScanKind::Accreditation.as_str())
        .fetch_one(pool)
        .await?;

        Ok(ValidatorOverview {
            scans_today,
            scans_total,
            accreditations_total,
        })
    }

    // `table` and `column` are compile-time literals from this module only.
    async fn status_counts(
        pool: &PgPool,
        table: &'static str,
        column: &'static str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let query = format!(
            "SELECT {column} AS status, COUNT(*) AS count
             FROM {table}
             GROUP BY {column}
             ORDER BY {column}"
        );
        sqlx::query_as::<_, StatusCount>(&query).fetch_all(pool).await
    }
}
