//! PostgreSQL-backed shopping cart repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use smartsales_application::CartRepository;
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Cart, CartLine};

use crate::postgres_support::internal;

/// PostgreSQL implementation of the cart repository port.
#[derive(Clone)]
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, cart_id: i64) -> AppResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT
                i.id,
                i.product_id,
                p.name AS product_name,
                p.price AS unit_price,
                i.quantity
            FROM cart_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.cart_id = $1
            ORDER BY i.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list cart lines"))?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    async fn active_cart_id(
        transaction: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> AppResult<i64> {
        sqlx::query(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) WHERE active DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut **transaction)
        .await
        .map_err(internal("create active cart"))?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM carts WHERE user_id = $1 AND active")
            .bind(user_id)
            .fetch_one(&mut **transaction)
            .await
            .map_err(internal("load active cart"))
    }
}

#[derive(Debug, FromRow)]
struct CartRow {
    id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
    active: bool,
}

#[derive(Debug, FromRow)]
struct CartLineRow {
    id: i64,
    product_id: i64,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_active_cart(&self, user_id: i64) -> AppResult<Option<Cart>> {
        let Some(row) = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, user_id, created_at, active
            FROM carts
            WHERE user_id = $1 AND active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find active cart"))?
        else {
            return Ok(None);
        };

        let lines = self.load_lines(row.id).await?;
        Ok(Some(Cart {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            active: row.active,
            lines,
        }))
    }

    async fn add_item(&self, user_id: i64, product_id: i64, quantity: i32) -> AppResult<Cart> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("start cart transaction"))?;

        let cart_id = Self::active_cart_id(&mut transaction, user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *transaction)
        .await
        .map_err(internal("add cart item"))?;

        transaction
            .commit()
            .await
            .map_err(internal("commit cart transaction"))?;

        self.find_active_cart(user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("active cart {cart_id} vanished")))
    }

    async fn clear_active_cart(&self, user_id: i64) -> AppResult<bool> {
        let cart_id =
            sqlx::query_scalar::<_, i64>("SELECT id FROM carts WHERE user_id = $1 AND active")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal("find active cart"))?;

        let Some(cart_id) = cart_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(internal("clear cart"))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests;
