//! Database maintenance and introspection.
//!
//! Table names reaching `vacuum` / `reindex` must come from
//! [`confdesk_core::maintenance::validate_table`]; identifiers cannot be
//! bound as parameters, so they are quoted and interpolated.

use sqlx::PgPool;

use crate::models::maintenance::{DatabaseStats, TableStats};

pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Size of the current database and connection counts from `pg_stat_activity`.
    pub async fn database_stats(pool: &PgPool) -> Result<DatabaseStats, sqlx::Error> {
        sqlx::query_as::<_, DatabaseStats>(
            "SELECT
                current_database()::TEXT AS database_name,
                pg_database_size(current_database()) AS size_bytes,
                COUNT(a.pid) AS total_connections,
                COUNT(a.pid) FILTER (WHERE a.state = 'active') AS active_connections,
                COUNT(a.pid) FILTER (WHERE a.state = 'idle') AS idle_connections,
                COUNT(a.pid) FILTER (WHERE a.state LIKE 'idle in transaction%') AS idle_in_transaction
             FROM pg_stat_activity a
             WHERE a.datname = current_database()",
        )
        .fetch_one(pool)
        .await
    }

    /// Row and vacuum statistics for the given (whitelisted) tables.
    pub async fn table_stats(
        pool: &PgPool,
        tables: &[&str],
    ) -> Result<Vec<TableStats>, sqlx::Error> {
        sqlx::query_as::<_, TableStats>(
            "SELECT
                relname::TEXT AS table_name,
                n_live_tup AS live_rows,
                n_dead_tup AS dead_rows,
                pg_total_relation_size(relid) AS total_size_bytes,
                last_vacuum,
                last_autovacuum,
                last_analyze
             FROM pg_stat_user_tables
             WHERE schemaname = current_schema() AND relname = ANY($1)
             ORDER BY relname",
        )
        .bind(tables)
        .fetch_all(pool)
        .await
    }

    /// `VACUUM` (optionally `ANALYZE`) one table. Runs outside a transaction.
    pub async fn vacuum(pool: &PgPool, table: &'static str, analyze: bool) -> Result<(), sqlx::Error> {
        let statement = if analyze {
            format!("VACUUM (ANALYZE) \"{table}\"")
        } else {
            format!("VACUUM \"{table}\"")
        };
        sqlx::raw_sql(&statement).execute(pool).await?;
        Ok(())
    }

    /// Rebuild every index on one table.
    pub async fn reindex(pool: &PgPool, table: &'static str) -> Result<(), sqlx::Error> {
        let statement = format!("REINDEX TABLE \"{table}\"");
        sqlx::raw_sql(&statement).execute(pool).await?;
        Ok(())
    }

    /// Terminate connections to this database idle for longer than
    /// `older_than_secs`. The calling backend is never terminated.
    ///
    /// Returns the number of backends terminated.
    pub async fn kill_idle_connections(
        pool: &PgPool,
        older_than_secs: i64,
    ) -> Result<u64, sqlx::Error> {
        let killed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM (
                SELECT pg_terminate_backend(pid) AS terminated
                FROM pg_stat_activity
                WHERE datname = current_database()
                  AND pid <> pg_backend_pid()
                  AND state IN ('idle', 'idle in transaction', 'idle in transaction (aborted)')
                  AND state_change < NOW() - make_interval(secs => $1)
             ) t
             WHERE t.terminated",
        )
        .bind(older_than_secs as f64)
        .fetch_one(pool)
        .await?;
        Ok(killed.max(0) as u64)
    }
}
