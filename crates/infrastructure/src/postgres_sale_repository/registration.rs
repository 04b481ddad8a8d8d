use smartsales_domain::{ProductDiscount, apply_percentage_discount, warranty_end_date};
use tracing::info;

use super::*;

#[derive(Debug, FromRow)]
struct LockedProductRow {
    name: String,
    price: Decimal,
    warranty_months: i32,
    discount_percentage: Option<Decimal>,
    discount_starts_on: Option<NaiveDate>,
    discount_ends_on: Option<NaiveDate>,
}

impl LockedProductRow {
    fn unit_price_on(&self, today: NaiveDate) -> Decimal {
        let discount = match (
            self.discount_percentage,
            self.discount_starts_on,
            self.discount_ends_on,
        ) {
            (Some(percentage), Some(starts_on), Some(ends_on)) => Some(ProductDiscount {
                percentage,
                starts_on,
                ends_on,
            }),
            _ => None,
        };

        match discount {
            Some(discount) if discount.applies_on(today) => {
                apply_percentage_discount(self.price, discount.percentage)
            }
            _ => self.price,
        }
    }
}

impl PostgresSaleRepository {
    pub(super) async fn register_sale_impl(&self, input: RegisterSaleInput) -> AppResult<Sale> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("start sale transaction"))?;

        let sale_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sales (customer_id, total, status)
            VALUES ($1, $2, 'pagado')
            RETURNING id
            "#,
        )
        .bind(input.customer_id)
        .bind(input.total)
        .fetch_one(&mut *transaction)
        .await
        .map_err(internal("insert sale"))?;

        for line in &input.lines {
            let product = sqlx::query_as::<_, LockedProductRow>(
                r#"
                SELECT
                    name,
                    price,
                    warranty_months,
                    discount_percentage,
                    discount_starts_on,
                    discount_ends_on
                FROM products
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(line.product_id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(internal("lock product for sale"))?
            .ok_or_else(|| {
                AppError::NotFound(format!("producto {} no encontrado", line.product_id))
            })?;

            let decremented = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - $2
                WHERE id = $1 AND stock >= $2
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *transaction)
            .await
            .map_err(internal("decrement product stock"))?;

            if decremented.rows_affected() == 0 {
                return Err(AppError::Validation(format!(
                    "stock insuficiente para el producto {}",
                    product.name
                )));
            }

            let unit_price = product.unit_price_on(input.registered_on);
            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(unit_price)
            .bind(unit_price * Decimal::from(line.quantity))
            .execute(&mut *transaction)
            .await
            .map_err(internal("insert sale line"))?;

            sqlx::query(
                r#"
                INSERT INTO warranties (product_id, sale_id, starts_on, ends_on, status)
                VALUES ($1, $2, $3, $4, 'activa')
                "#,
            )
            .bind(line.product_id)
            .bind(sale_id)
            .bind(input.registered_on)
            .bind(warranty_end_date(input.registered_on, product.warranty_months))
            .execute(&mut *transaction)
            .await
            .map_err(internal("insert warranty"))?;
        }

        transaction
            .commit()
            .await
            .map_err(internal("commit sale transaction"))?;

        info!(sale_id, customer_id = input.customer_id, "sale registered");
        self.find_sale_impl(sale_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("sale {sale_id} vanished after commit")))
    }

    pub(super) async fn cancel_sale_impl(&self, sale_id: i64) -> AppResult<Sale> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("start cancellation transaction"))?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(internal("lock sale for cancellation"))?
        .ok_or_else(|| AppError::NotFound(format!("venta {sale_id} no encontrada")))?;

        if status.parse::<SaleStatus>()? == SaleStatus::Cancelado {
            return Err(AppError::Conflict(format!(
                "la venta #{sale_id} ya está cancelada"
            )));
        }

        sqlx::query(
            r#"
            UPDATE products p
            SET stock = p.stock + returned.quantity
            FROM (
                SELECT product_id, SUM(quantity)::INT AS quantity
                FROM sale_lines
                WHERE sale_id = $1
                GROUP BY product_id
            ) returned
            WHERE p.id = returned.product_id
            "#,
        )
        .bind(sale_id)
        .execute(&mut *transaction)
        .await
        .map_err(internal("restore stock"))?;

        sqlx::query("UPDATE sales SET status = 'cancelado' WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *transaction)
            .await
            .map_err(internal("mark sale cancelled"))?;

        transaction
            .commit()
            .await
            .map_err(internal("commit cancellation transaction"))?;

        info!(sale_id, "sale cancelled and stock restored");
        self.find_sale_impl(sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("venta {sale_id} no encontrada")))
    }
}
