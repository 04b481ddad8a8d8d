use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use smartsales_application::{AuditLogQuery, AuditRepository, NewAuditEntry};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::AuditEntry;

/// PostgreSQL implementation of the append-only audit log.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditEntryRow {
    id: i64,
    user_id: Option<i64>,
    username: Option<String>,
    action: String,
    ip: Option<String>,
    recorded_at: DateTime<Utc>,
    success: bool,
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_entry(&self, entry: NewAuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (user_id, username, action, ip, success)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.username)
        .bind(entry.action)
        .bind(entry.ip)
        .bind(entry.success)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(())
    }

    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        let capped_limit = query.limit.clamp(1, 200) as i64;
        let capped_offset = query.offset.min(5_000) as i64;
        let search = query
            .search
            .map(|search| search.trim().to_owned())
            .filter(|search| !search.is_empty())
            .map(|search| format!("%{search}%"));

        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, user_id, username, action, ip, recorded_at, success
            FROM audit_entries
            WHERE $1::TEXT IS NULL
                OR username ILIKE $1
                OR action ILIKE $1
                OR ip ILIKE $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(search)
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit entries: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| AuditEntry {
                id: row.id,
                user_id: row.user_id,
                username: row.username,
                action: row.action,
                ip: row.ip,
                recorded_at: row.recorded_at,
                success: row.success,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests;
