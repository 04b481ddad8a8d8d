//! PostgreSQL-backed discount repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use smartsales_application::DiscountRepository;
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Discount, DiscountDraft};

use crate::postgres_support::{internal, referenced_or_internal};

/// PostgreSQL implementation of the discount repository port.
#[derive(Clone)]
pub struct PostgresDiscountRepository {
    pool: PgPool,
}

impl PostgresDiscountRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DiscountRow {
    id: i64,
    product_id: Option<i64>,
    product_name: Option<String>,
    percentage: Decimal,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<DiscountRow> for Discount {
    fn from(row: DiscountRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            percentage: row.percentage,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

fn missing(discount_id: i64) -> AppError {
    AppError::NotFound(format!("descuento {discount_id} no encontrado"))
}

#[async_trait]
impl DiscountRepository for PostgresDiscountRepository {
    async fn list_discounts(&self) -> AppResult<Vec<Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT d.id, d.product_id, p.name AS product_name, d.percentage,
                   d.starts_on, d.ends_on, d.description, d.active, d.created_at
            FROM discounts d
            LEFT JOIN products p ON p.id = d.product_id
            ORDER BY d.created_at DESC, d.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list discounts"))?;

        Ok(rows.into_iter().map(Discount::from).collect())
    }

    async fn find_discount(&self, discount_id: i64) -> AppResult<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT d.id, d.product_id, p.name AS product_name, d.percentage,
                   d.starts_on, d.ends_on, d.description, d.active, d.created_at
            FROM discounts d
            LEFT JOIN products p ON p.id = d.product_id
            WHERE d.id = $1
            "#,
        )
        .bind(discount_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find discount"))?;

        Ok(row.map(Discount::from))
    }

    async fn create_discount(&self, draft: DiscountDraft) -> AppResult<Discount> {
        let discount_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO discounts (product_id, percentage, starts_on, ends_on, description, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(draft.product_id)
        .bind(draft.percentage)
        .bind(draft.starts_on)
        .bind(draft.ends_on)
        .bind(draft.description.as_str())
        .bind(draft.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            referenced_or_internal(error, "el producto del descuento no existe", "create discount")
        })?;

        self.find_discount(discount_id)
            .await?
            .ok_or_else(|| missing(discount_id))
    }

    async fn update_discount(&self, discount_id: i64, draft: DiscountDraft) -> AppResult<Discount> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET product_id = $2,
                percentage = $3,
                starts_on = $4,
                ends_on = $5,
                description = $6,
                active = $7
            WHERE id = $1
            "#,
        )
        .bind(discount_id)
        .bind(draft.product_id)
        .bind(draft.percentage)
        .bind(draft.starts_on)
        .bind(draft.ends_on)
        .bind(draft.description.as_str())
        .bind(draft.active)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            referenced_or_internal(error, "el producto del descuento no existe", "update discount")
        })?;

        if result.rows_affected() == 0 {
            return Err(missing(discount_id));
        }

        self.find_discount(discount_id)
            .await?
            .ok_or_else(|| missing(discount_id))
    }

    async fn delete_discount(&self, discount_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(discount_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete discount"))?;

        if result.rows_affected() == 0 {
            return Err(missing(discount_id));
        }

        Ok(())
    }

    async fn set_active(&self, discount_id: i64, active: bool) -> AppResult<Discount> {
        let result = sqlx::query("UPDATE discounts SET active = $2 WHERE id = $1")
            .bind(discount_id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(internal("toggle discount"))?;

        if result.rows_affected() == 0 {
            return Err(missing(discount_id));
        }

        self.find_discount(discount_id)
            .await?
            .ok_or_else(|| missing(discount_id))
    }

    async fn list_current(&self, today: NaiveDate) -> AppResult<Vec<Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT d.id, d.product_id, p.name AS product_name, d.percentage,
                   d.starts_on, d.ends_on, d.description, d.active, d.created_at
            FROM discounts d
            LEFT JOIN products p ON p.id = d.product_id
            WHERE d.active AND d.starts_on <= $1 AND d.ends_on >= $1
            ORDER BY d.created_at DESC, d.id DESC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list current discounts"))?;

        Ok(rows.into_iter().map(Discount::from).collect())
    }

    async fn list_for_product(&self, product_id: i64) -> AppResult<Vec<Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT d.id, d.product_id, p.name AS product_name, d.percentage,
                   d.starts_on, d.ends_on, d.description, d.active, d.created_at
            FROM discounts d
            LEFT JOIN products p ON p.id = d.product_id
            WHERE d.product_id = $1
            ORDER BY d.created_at DESC, d.id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list product discounts"))?;

        Ok(rows.into_iter().map(Discount::from).collect())
    }
}

#[cfg(test)]
mod tests;
