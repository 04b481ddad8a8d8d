//! PostgreSQL-backed catalog repository for brands, categories and products.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use smartsales_application::{CatalogRepository, ProductOrdering, ProductQuery};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Brand, Category, Product, ProductDiscount, ProductDraft};

use crate::postgres_support::{conflict_or_internal, internal, referenced_or_internal};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.price,
        p.stock,
        p.warranty_months,
        p.brand_id,
        b.name AS brand_name,
        p.category_id,
        c.name AS category_name,
        p.image_url,
        p.active,
        p.created_at,
        p.discount_percentage,
        p.discount_starts_on,
        p.discount_ends_on
    FROM products p
    LEFT JOIN brands b ON b.id = p.brand_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// PostgreSQL implementation of the catalog repository port.
#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    warranty_months: i32,
    brand_id: Option<i64>,
    brand_name: Option<String>,
    category_id: Option<i64>,
    category_name: Option<String>,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    discount_percentage: Option<Decimal>,
    discount_starts_on: Option<NaiveDate>,
    discount_ends_on: Option<NaiveDate>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let discount = match (
            row.discount_percentage,
            row.discount_starts_on,
            row.discount_ends_on,
        ) {
            (Some(percentage), Some(starts_on), Some(ends_on)) => Some(ProductDiscount {
                percentage,
                starts_on,
                ends_on,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            warranty_months: row.warranty_months,
            brand: row
                .brand_id
                .zip(row.brand_name)
                .map(|(id, name)| Brand { id, name }),
            category: row
                .category_id
                .zip(row.category_name)
                .map(|(id, name)| Category { id, name }),
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
            discount,
        }
    }
}

/// Loads every listed product, used by the report data source as well.
pub(crate) async fn fetch_active_products(pool: &PgPool) -> AppResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{PRODUCT_SELECT} WHERE p.active ORDER BY p.name"
    ))
    .fetch_all(pool)
    .await
    .map_err(internal("list active products"))?;

    Ok(rows.into_iter().map(Product::from).collect())
}

fn push_ordering(builder: &mut QueryBuilder<'_, Postgres>, ordering: ProductOrdering) {
    builder.push(match ordering {
        ProductOrdering::Name => " ORDER BY p.name, p.id",
        ProductOrdering::PriceAscending => " ORDER BY p.price, p.id",
        ProductOrdering::PriceDescending => " ORDER BY p.price DESC, p.id",
        ProductOrdering::CreatedAscending => " ORDER BY p.created_at, p.id",
        ProductOrdering::CreatedDescending => " ORDER BY p.created_at DESC, p.id DESC",
    });
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        let rows = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM brands ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(internal("list brands"))?;

        Ok(rows
            .into_iter()
            .map(|row| Brand {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn find_brand(&self, brand_id: i64) -> AppResult<Option<Brand>> {
        let row = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM brands WHERE id = $1")
            .bind(brand_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("find brand"))?;

        Ok(row.map(|row| Brand {
            id: row.id,
            name: row.name,
        }))
    }

    async fn create_brand(&self, name: &str) -> AppResult<Brand> {
        let row = sqlx::query_as::<_, NamedRow>(
            "INSERT INTO brands (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, &format!("la marca '{name}' ya existe"), "create brand")
        })?;

        Ok(Brand {
            id: row.id,
            name: row.name,
        })
    }

    async fn update_brand(&self, brand_id: i64, name: &str) -> AppResult<Brand> {
        let row = sqlx::query_as::<_, NamedRow>(
            "UPDATE brands SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(brand_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, &format!("la marca '{name}' ya existe"), "update brand")
        })?
        .ok_or_else(|| AppError::NotFound(format!("marca {brand_id} no encontrada")))?;

        Ok(Brand {
            id: row.id,
            name: row.name,
        })
    }

    async fn delete_brand(&self, brand_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(brand_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete brand"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("marca {brand_id} no encontrada")));
        }

        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows =
            sqlx::query_as::<_, NamedRow>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(internal("list categories"))?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn find_category(&self, category_id: i64) -> AppResult<Option<Category>> {
        let row =
            sqlx::query_as::<_, NamedRow>("SELECT id, name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal("find category"))?;

        Ok(row.map(|row| Category {
            id: row.id,
            name: row.name,
        }))
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        let row = sqlx::query_as::<_, NamedRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                &format!("la categoría '{name}' ya existe"),
                "create category",
            )
        })?;

        Ok(Category {
            id: row.id,
            name: row.name,
        })
    }

    async fn update_category(&self, category_id: i64, name: &str) -> AppResult<Category> {
        let row = sqlx::query_as::<_, NamedRow>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(category_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                &format!("la categoría '{name}' ya existe"),
                "update category",
            )
        })?
        .ok_or_else(|| AppError::NotFound(format!("categoría {category_id} no encontrada")))?;

        Ok(Category {
            id: row.id,
            name: row.name,
        })
    }

    async fn delete_category(&self, category_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete category"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "categoría {category_id} no encontrada"
            )));
        }

        Ok(())
    }

    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(PRODUCT_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(brand_id) = query.brand_id {
            builder.push(" AND p.brand_id = ");
            builder.push_bind(brand_id);
        }
        if let Some(category_id) = query.category_id {
            builder.push(" AND p.category_id = ");
            builder.push_bind(category_id);
        }
        if let Some(active) = query.active {
            builder.push(" AND p.active = ");
            builder.push_bind(active);
        }
        if let Some(search) = query.search {
            let pattern = format!("%{search}%");
            builder.push(" AND (p.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR b.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR c.name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        push_ordering(&mut builder, query.ordering);

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(internal("list products"))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, product_id: i64) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("find product"))?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, draft: ProductDraft) -> AppResult<Product> {
        let product_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (
                name,
                description,
                price,
                stock,
                warranty_months,
                brand_id,
                category_id,
                image_url,
                active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(draft.name.as_str())
        .bind(draft.description.as_str())
        .bind(draft.price)
        .bind(draft.stock)
        .bind(draft.warranty_months)
        .bind(draft.brand_id)
        .bind(draft.category_id)
        .bind(draft.image_url.as_deref())
        .bind(draft.active)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("create product"))?;

        self.find_product(product_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("product {product_id} vanished after insert")))
    }

    async fn update_product(&self, product_id: i64, draft: ProductDraft) -> AppResult<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                stock = $5,
                warranty_months = $6,
                brand_id = $7,
                category_id = $8,
                image_url = $9,
                active = $10
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .bind(draft.name.as_str())
        .bind(draft.description.as_str())
        .bind(draft.price)
        .bind(draft.stock)
        .bind(draft.warranty_months)
        .bind(draft.brand_id)
        .bind(draft.category_id)
        .bind(draft.image_url.as_deref())
        .bind(draft.active)
        .execute(&self.pool)
        .await
        .map_err(internal("update product"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("producto {product_id} no encontrado")));
        }

        self.find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id} no encontrado")))
    }

    async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                referenced_or_internal(
                    error,
                    "el producto tiene ventas registradas y no puede eliminarse",
                    "delete product",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("producto {product_id} no encontrado")));
        }

        Ok(())
    }

    async fn set_product_discount(
        &self,
        product_id: i64,
        discount: Option<ProductDiscount>,
    ) -> AppResult<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET discount_percentage = $2,
                discount_starts_on = $3,
                discount_ends_on = $4
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .bind(discount.map(|discount| discount.percentage))
        .bind(discount.map(|discount| discount.starts_on))
        .bind(discount.map(|discount| discount.ends_on))
        .execute(&self.pool)
        .await
        .map_err(internal("set product discount"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("producto {product_id} no encontrado")));
        }

        self.find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id} no encontrado")))
    }
}

#[cfg(test)]
mod tests;
