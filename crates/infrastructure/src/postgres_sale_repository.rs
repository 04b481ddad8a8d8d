//! PostgreSQL-backed sale repository.
//!
//! Registration and cancellation run inside one transaction each. Stock is
//! decremented with a conditional `UPDATE ... WHERE stock >= quantity` on a
//! row locked with `FOR UPDATE`, so concurrent sales cannot oversell.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use smartsales_application::{RegisterSaleInput, SaleQuery, SaleRepository};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{MonthlySales, Sale, SaleLine, SaleStatus, Warranty};

use crate::postgres_support::internal;

mod history;
mod registration;

/// PostgreSQL implementation of the sale repository port.
#[derive(Clone)]
pub struct PostgresSaleRepository {
    pool: PgPool,
}

impl PostgresSaleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SaleRow {
    id: i64,
    customer_id: i64,
    customer_username: String,
    created_at: DateTime<Utc>,
    total: Decimal,
    status: String,
}

#[derive(Debug, FromRow)]
struct SaleLineRow {
    id: i64,
    sale_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

#[derive(Debug, FromRow)]
struct WarrantyRow {
    id: i64,
    product_id: i64,
    product_name: String,
    sale_id: i64,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    status: String,
}

impl TryFrom<WarrantyRow> for Warranty {
    type Error = AppError;

    fn try_from(row: WarrantyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            sale_id: row.sale_id,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            status: row.status.parse()?,
        })
    }
}

/// Loads the lines of `rows` in one query and assembles sales in row order.
pub(crate) async fn attach_lines(pool: &PgPool, rows: Vec<SaleRow>) -> AppResult<Vec<Sale>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let sale_ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let line_rows = sqlx::query_as::<_, SaleLineRow>(
        r#"
        SELECT
            l.id,
            l.sale_id,
            l.product_id,
            p.name AS product_name,
            l.quantity,
            l.unit_price,
            l.subtotal
        FROM sale_lines l
        JOIN products p ON p.id = l.product_id
        WHERE l.sale_id = ANY($1)
        ORDER BY l.id
        "#,
    )
    .bind(&sale_ids)
    .fetch_all(pool)
    .await
    .map_err(internal("list sale lines"))?;

    let mut lines_by_sale: HashMap<i64, Vec<SaleLine>> = HashMap::new();
    for row in line_rows {
        lines_by_sale.entry(row.sale_id).or_default().push(SaleLine {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        });
    }

    rows.into_iter()
        .map(|row| {
            Ok(Sale {
                id: row.id,
                customer_id: row.customer_id,
                customer_username: row.customer_username,
                created_at: row.created_at,
                total: row.total,
                status: row.status.parse()?,
                lines: lines_by_sale.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl SaleRepository for PostgresSaleRepository {
    async fn register_sale(&self, input: RegisterSaleInput) -> AppResult<Sale> {
        self.register_sale_impl(input).await
    }

    async fn cancel_sale(&self, sale_id: i64) -> AppResult<Sale> {
        self.cancel_sale_impl(sale_id).await
    }

    async fn find_sale(&self, sale_id: i64) -> AppResult<Option<Sale>> {
        self.find_sale_impl(sale_id).await
    }

    async fn list_sales(&self, query: SaleQuery) -> AppResult<Vec<Sale>> {
        self.list_sales_impl(query).await
    }

    async fn update_status(&self, sale_id: i64, status: SaleStatus) -> AppResult<Sale> {
        self.update_status_impl(sale_id, status).await
    }

    async fn list_warranties(&self, sale_id: i64) -> AppResult<Vec<Warranty>> {
        self.list_warranties_impl(sale_id).await
    }

    async fn monthly_totals(&self) -> AppResult<Vec<MonthlySales>> {
        self.monthly_totals_impl().await
    }
}
