use std::str::FromStr;

use async_trait::async_trait;
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Brand, Category, Product, ProductDiscount, ProductDraft};

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrdering {
    /// Alphabetical by name.
    #[default]
    Name,
    /// Cheapest first.
    PriceAscending,
    /// Most expensive first.
    PriceDescending,
    /// Oldest first.
    CreatedAscending,
    /// Newest first.
    CreatedDescending,
}

impl FromStr for ProductOrdering {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "nombre" => Ok(Self::Name),
            "precio" => Ok(Self::PriceAscending),
            "-precio" => Ok(Self::PriceDescending),
            "fecha_creacion" => Ok(Self::CreatedAscending),
            "-fecha_creacion" => Ok(Self::CreatedDescending),
            _ => Err(AppError::Validation(format!("ordenamiento no soportado '{value}'"))),
        }
    }
}

/// Product listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Restrict to one brand.
    pub brand_id: Option<i64>,
    /// Restrict to one category.
    pub category_id: Option<i64>,
    /// Restrict by listing state.
    pub active: Option<bool>,
    /// Case-insensitive match over name, description, brand and category.
    pub search: Option<String>,
    /// Sort order.
    pub ordering: ProductOrdering,
}

/// Repository port for brands, categories and products.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists brands by name.
    async fn list_brands(&self) -> AppResult<Vec<Brand>>;

    /// Finds a brand.
    async fn find_brand(&self, brand_id: i64) -> AppResult<Option<Brand>>;

    /// Creates a brand.
    async fn create_brand(&self, name: &str) -> AppResult<Brand>;

    /// Renames a brand.
    async fn update_brand(&self, brand_id: i64, name: &str) -> AppResult<Brand>;

    /// Deletes a brand; products keep no brand.
    async fn delete_brand(&self, brand_id: i64) -> AppResult<()>;

    /// Lists categories by name.
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// Finds a category.
    async fn find_category(&self, category_id: i64) -> AppResult<Option<Category>>;

    /// Creates a category.
    async fn create_category(&self, name: &str) -> AppResult<Category>;

    /// Renames a category.
    async fn update_category(&self, category_id: i64, name: &str) -> AppResult<Category>;

    /// Deletes a category; products keep no category.
    async fn delete_category(&self, category_id: i64) -> AppResult<()>;

    /// Lists products matching the query.
    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>>;

    /// Finds a product.
    async fn find_product(&self, product_id: i64) -> AppResult<Option<Product>>;

    /// Creates a product.
    async fn create_product(&self, draft: ProductDraft) -> AppResult<Product>;

    /// Replaces product attributes.
    async fn update_product(&self, product_id: i64, draft: ProductDraft) -> AppResult<Product>;

    /// Deletes a product.
    async fn delete_product(&self, product_id: i64) -> AppResult<()>;

    /// Sets or clears the discount copied onto a product.
    async fn set_product_discount(
        &self,
        product_id: i64,
        discount: Option<ProductDiscount>,
    ) -> AppResult<Product>;
}
