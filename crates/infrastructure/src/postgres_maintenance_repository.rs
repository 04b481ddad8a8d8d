//! PostgreSQL-backed maintenance ticket repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use smartsales_application::{MaintenanceQuery, MaintenanceRepository, NewMaintenanceTicket};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::MaintenanceTicket;

use crate::postgres_support::internal;

/// PostgreSQL implementation of the maintenance repository port.
#[derive(Clone)]
pub struct PostgresMaintenanceRepository {
    pool: PgPool,
}

impl PostgresMaintenanceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    id: i64,
    product_id: i64,
    product_name: String,
    technician_id: Option<i64>,
    customer_id: i64,
    sale_id: i64,
    requested_at: DateTime<Utc>,
    performed_at: Option<DateTime<Utc>>,
    kind: String,
    status: String,
    description: String,
    covered_by_warranty: bool,
    cost: Option<Decimal>,
    technician_notes: Option<String>,
}

impl TryFrom<TicketRow> for MaintenanceTicket {
    type Error = AppError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            technician_id: row.technician_id,
            customer_id: row.customer_id,
            sale_id: row.sale_id,
            requested_at: row.requested_at,
            performed_at: row.performed_at,
            kind: row.kind.parse()?,
            status: row.status.parse()?,
            description: row.description,
            covered_by_warranty: row.covered_by_warranty,
            cost: row.cost,
            technician_notes: row.technician_notes,
        })
    }
}

fn missing(ticket_id: i64) -> AppError {
    AppError::NotFound(format!("mantenimiento {ticket_id} no encontrado"))
}

#[async_trait]
impl MaintenanceRepository for PostgresMaintenanceRepository {
    async fn create_ticket(&self, input: NewMaintenanceTicket) -> AppResult<MaintenanceTicket> {
        let ticket_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO maintenance_tickets (
                product_id,
                customer_id,
                sale_id,
                kind,
                description,
                covered_by_warranty
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(input.customer_id)
        .bind(input.sale_id)
        .bind(input.kind.as_str())
        .bind(input.description.as_str())
        .bind(input.covered_by_warranty)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("create maintenance ticket"))?;

        self.find_ticket(ticket_id)
            .await?
            .ok_or_else(|| missing(ticket_id))
    }

    async fn find_ticket(&self, ticket_id: i64) -> AppResult<Option<MaintenanceTicket>> {
        sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT
                m.id, m.product_id, p.name AS product_name, m.technician_id, m.customer_id,
                m.sale_id, m.requested_at, m.performed_at, m.kind, m.status, m.description,
                m.covered_by_warranty, m.cost, m.technician_notes
            FROM maintenance_tickets m
            JOIN products p ON p.id = m.product_id
            WHERE m.id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find maintenance ticket"))?
        .map(MaintenanceTicket::try_from)
        .transpose()
    }

    async fn list_tickets(&self, query: MaintenanceQuery) -> AppResult<Vec<MaintenanceTicket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT
                m.id, m.product_id, p.name AS product_name, m.technician_id, m.customer_id,
                m.sale_id, m.requested_at, m.performed_at, m.kind, m.status, m.description,
                m.covered_by_warranty, m.cost, m.technician_notes
            FROM maintenance_tickets m
            JOIN products p ON p.id = m.product_id
            WHERE ($1::BIGINT IS NULL OR m.customer_id = $1)
                AND ($2::BIGINT IS NULL OR m.technician_id = $2)
            ORDER BY m.requested_at DESC, m.id DESC
            "#,
        )
        .bind(query.customer_id)
        .bind(query.technician_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list maintenance tickets"))?;

        rows.into_iter().map(MaintenanceTicket::try_from).collect()
    }

    async fn save_ticket(&self, ticket: &MaintenanceTicket) -> AppResult<MaintenanceTicket> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance_tickets
            SET technician_id = $2,
                status = $3,
                performed_at = $4,
                cost = $5,
                technician_notes = $6
            WHERE id = $1
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.technician_id)
        .bind(ticket.status.as_str())
        .bind(ticket.performed_at)
        .bind(ticket.cost)
        .bind(ticket.technician_notes.as_deref())
        .execute(&self.pool)
        .await
        .map_err(internal("save maintenance ticket"))?;

        if result.rows_affected() == 0 {
            return Err(missing(ticket.id));
        }

        self.find_ticket(ticket.id)
            .await?
            .ok_or_else(|| missing(ticket.id))
    }

    async fn delete_ticket(&self, ticket_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_tickets WHERE id = $1")
            .bind(ticket_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete maintenance ticket"))?;

        if result.rows_affected() == 0 {
            return Err(missing(ticket_id));
        }

        Ok(())
    }

    async fn has_open_ticket(&self, product_id: i64, sale_id: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM maintenance_tickets
                WHERE product_id = $1
                    AND sale_id = $2
                    AND status IN ('pendiente', 'en_proceso')
            )
            "#,
        )
        .bind(product_id)
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("check open maintenance tickets"))
    }
}

#[cfg(test)]
mod tests;
