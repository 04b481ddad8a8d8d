use rust_decimal::prelude::ToPrimitive;
use smartsales_domain::YearMonth;

use super::*;

#[derive(Debug, FromRow)]
struct MonthlyTotalRow {
    year: i32,
    month: i32,
    total: Decimal,
}

impl PostgresSaleRepository {
    pub(super) async fn find_sale_impl(&self, sale_id: i64) -> AppResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
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
            WHERE s.id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find sale"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(attach_lines(&self.pool, vec![row]).await?.pop())
    }

    pub(super) async fn list_sales_impl(&self, query: SaleQuery) -> AppResult<Vec<Sale>> {
        let limit = query
            .limit
            .map(|limit| {
                i64::try_from(limit).map_err(|error| {
                    AppError::Validation(format!("invalid sale query limit: {error}"))
                })
            })
            .transpose()?;

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
            WHERE ($1::BIGINT IS NULL OR s.customer_id = $1)
                AND ($2::TEXT IS NULL OR s.status = $2)
                AND ($3::DATE IS NULL OR (s.created_at AT TIME ZONE 'UTC')::DATE >= $3)
                AND ($4::DATE IS NULL OR (s.created_at AT TIME ZONE 'UTC')::DATE <= $4)
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $5
            "#,
        )
        .bind(query.customer_id)
        .bind(query.status.map(|status| status.as_str()))
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list sales"))?;

        attach_lines(&self.pool, rows).await
    }

    pub(super) async fn update_status_impl(
        &self,
        sale_id: i64,
        status: SaleStatus,
    ) -> AppResult<Sale> {
        let result = sqlx::query(
            "UPDATE sales SET status = $2 WHERE id = $1 AND status <> 'cancelado'",
        )
        .bind(sale_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(internal("update sale status"))?;

        if result.rows_affected() == 0 {
            return match self.find_sale_impl(sale_id).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "la venta #{sale_id} está cancelada y no puede modificarse"
                ))),
                None => Err(AppError::NotFound(format!("venta {sale_id} no encontrada"))),
            };
        }

        self.find_sale_impl(sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("venta {sale_id} no encontrada")))
    }

    pub(super) async fn list_warranties_impl(&self, sale_id: i64) -> AppResult<Vec<Warranty>> {
        let rows = sqlx::query_as::<_, WarrantyRow>(
            r#"
            SELECT
                w.id,
                w.product_id,
                p.name AS product_name,
                w.sale_id,
                w.starts_on,
                w.ends_on,
                w.status
            FROM warranties w
            JOIN products p ON p.id = w.product_id
            WHERE w.sale_id = $1
            ORDER BY w.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list warranties"))?;

        rows.into_iter().map(Warranty::try_from).collect()
    }

    pub(super) async fn monthly_totals_impl(&self) -> AppResult<Vec<MonthlySales>> {
        let rows = sqlx::query_as::<_, MonthlyTotalRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::INT AS year,
                EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::INT AS month,
                SUM(total) AS total
            FROM sales
            WHERE status <> 'cancelado'
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("aggregate monthly sales"))?;

        rows.into_iter()
            .map(|row| {
                let month = u32::try_from(row.month).map_err(|error| {
                    AppError::Internal(format!("invalid month {}: {error}", row.month))
                })?;
                Ok(MonthlySales {
                    period: YearMonth::new(row.year, month)?,
                    total: row.total.to_f64().unwrap_or_default(),
                })
            })
            .collect()
    }
}
