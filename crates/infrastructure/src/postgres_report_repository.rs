//! PostgreSQL-backed report persistence and report read-side queries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use smartsales_application::{
    CustomerPurchaseSummary, NewReport, ReportDataSource, ReportQuery, ReportRepository,
};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Product, Report, Sale};

use crate::postgres_catalog_repository::fetch_active_products;
use crate::postgres_sale_repository::{SaleRow, attach_lines};
use crate::postgres_support::internal;

/// PostgreSQL implementation of the report repository port.
#[derive(Clone)]
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReportRow {
    id: i64,
    report_type: String,
    format: String,
    generated_at: DateTime<Utc>,
    requested_by: Option<i64>,
    requested_by_username: Option<String>,
    file_path: Option<String>,
    parameters: serde_json::Value,
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
    description: String,
}

impl TryFrom<ReportRow> for Report {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            report_type: row.report_type.parse()?,
            format: row.format.parse()?,
            generated_at: row.generated_at,
            requested_by: row.requested_by,
            requested_by_username: row.requested_by_username,
            file_path: row.file_path,
            parameters: row.parameters,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            description: row.description,
        })
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn create_report(&self, input: NewReport) -> AppResult<Report> {
        let report_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reports (
                report_type,
                format,
                requested_by,
                file_path,
                parameters,
                starts_on,
                ends_on,
                description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(input.report_type.as_str())
        .bind(input.format.as_str())
        .bind(input.requested_by)
        .bind(input.file_path.as_str())
        .bind(input.parameters)
        .bind(input.starts_on)
        .bind(input.ends_on)
        .bind(input.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(internal("create report"))?;

        self.find_report(report_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("report {report_id} vanished after insert")))
    }

    async fn find_report(&self, report_id: i64) -> AppResult<Option<Report>> {
        sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT
                r.id, r.report_type, r.format, r.generated_at, r.requested_by,
                u.username AS requested_by_username, r.file_path, r.parameters,
                r.starts_on, r.ends_on, r.description
            FROM reports r
            LEFT JOIN users u ON u.id = r.requested_by
            WHERE r.id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find report"))?
        .map(Report::try_from)
        .transpose()
    }

    async fn list_reports(&self, query: ReportQuery) -> AppResult<Vec<Report>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT
                r.id, r.report_type, r.format, r.generated_at, r.requested_by,
                u.username AS requested_by_username, r.file_path, r.parameters,
                r.starts_on, r.ends_on, r.description
            FROM reports r
            LEFT JOIN users u ON u.id = r.requested_by
            WHERE ($1::BIGINT IS NULL OR r.requested_by = $1)
                AND ($2::TEXT IS NULL OR r.report_type = $2)
                AND ($3::TEXT IS NULL OR r.format = $3)
                AND ($4::DATE IS NULL OR (r.generated_at AT TIME ZONE 'UTC')::DATE >= $4)
            ORDER BY r.generated_at DESC, r.id DESC
            "#,
        )
        .bind(query.requested_by)
        .bind(query.report_type.map(|report_type| report_type.as_str()))
        .bind(query.format.map(|format| format.as_str()))
        .bind(query.generated_since)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list reports"))?;

        rows.into_iter().map(Report::try_from).collect()
    }

    async fn delete_report(&self, report_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete report"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("reporte {report_id} no encontrado")));
        }

        Ok(())
    }
}

/// PostgreSQL read-side queries feeding report assembly.
#[derive(Clone)]
pub struct PostgresReportDataSource {
    pool: PgPool,
}

impl PostgresReportDataSource {
    /// Creates a data source with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CustomerSummaryRow {
    user_id: i64,
    username: String,
    email: String,
    purchases: i64,
    total_spent: Decimal,
    joined_at: DateTime<Utc>,
}

#[async_trait]
impl ReportDataSource for PostgresReportDataSource {
    async fn paid_sales(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                s.id,
                s.customer_id,
                u.username AS customer_username,
                s.created_at,
                s.total,
                s.status
            FROM sales s
            JOIN users u ON u.id = s.customer_id
            WHERE s.status = 'pagado'
                AND ($1::DATE IS NULL OR (s.created_at AT TIME ZONE 'UTC')::DATE >= $1)
                AND ($2::DATE IS NULL OR (s.created_at AT TIME ZONE 'UTC')::DATE <= $2)
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list paid sales for report"))?;

        attach_lines(&self.pool, rows).await
    }

    async fn active_products(&self) -> AppResult<Vec<Product>> {
        fetch_active_products(&self.pool).await
    }

    async fn customer_summaries(&self) -> AppResult<Vec<CustomerPurchaseSummary>> {
        let rows = sqlx::query_as::<_, CustomerSummaryRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                u.email,
                COUNT(s.id) AS purchases,
                COALESCE(SUM(s.total), 0) AS total_spent,
                u.joined_at
            FROM users u
            LEFT JOIN sales s ON s.customer_id = u.id AND s.status = 'pagado'
            WHERE u.role = 'cliente'
            GROUP BY u.id
            ORDER BY total_spent DESC, u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("summarize customer purchases"))?;

        Ok(rows
            .into_iter()
            .map(|row| CustomerPurchaseSummary {
                user_id: row.user_id,
                username: row.username,
                email: row.email,
                purchases: row.purchases,
                total_spent: row.total_spent,
                joined_at: row.joined_at,
            })
            .collect())
    }
}
