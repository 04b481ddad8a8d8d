//! Shared fakes for application service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use smartsales_core::{ActorContext, AppError, AppResult, UserRole};
use smartsales_domain::{
    AuditEntry, Brand, Category, Product, ProductDiscount, ProductDraft, Sale, SaleLine,
    SaleStatus,
};
use tokio::sync::Mutex;

use crate::{
    AuditLogQuery, AuditRecorder, AuditRepository, CatalogRepository, DocumentStore,
    NewAuditEntry, ProductQuery,
};

#[derive(Default)]
pub(crate) struct RecordingAuditRepository {
    pub(crate) entries: Mutex<Vec<NewAuditEntry>>,
}

impl RecordingAuditRepository {
    pub(crate) async fn actions(&self) -> Vec<String> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|entry| entry.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditRepository for RecordingAuditRepository {
    async fn append_entry(&self, entry: NewAuditEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list_entries(&self, _query: AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        Ok(Vec::new())
    }
}

pub(crate) fn recorder() -> (AuditRecorder, Arc<RecordingAuditRepository>) {
    let repository = Arc::new(RecordingAuditRepository::default());
    (AuditRecorder::new(repository.clone()), repository)
}

pub(crate) fn actor(user_id: i64, role: UserRole) -> ActorContext {
    ActorContext::new(
        user_id,
        format!("user{user_id}"),
        role,
        Some("192.168.1.20".to_owned()),
    )
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        panic!("invalid test date {year}-{month}-{day}");
    };
    date
}

pub(crate) fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    let Some(timestamp) = Utc
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
    else {
        panic!("invalid test timestamp");
    };
    timestamp
}

pub(crate) fn product(id: i64, name: &str, price: i64, stock: i32) -> Product {
    Product {
        id,
        name: name.to_owned(),
        description: String::new(),
        price: Decimal::from(price),
        stock,
        warranty_months: 12,
        brand: None,
        category: None,
        image_url: None,
        active: true,
        created_at: timestamp(2024, 1, 1, 9),
        discount: None,
    }
}

pub(crate) fn paid_sale(
    id: i64,
    customer: &str,
    created_at: DateTime<Utc>,
    lines: &[(&str, i32, i64)],
) -> Sale {
    let lines = lines
        .iter()
        .enumerate()
        .map(|(index, (name, quantity, unit_price))| SaleLine {
            id: id * 100 + i64::try_from(index).unwrap_or_default(),
            product_id: i64::try_from(index).unwrap_or_default() + 1,
            product_name: (*name).to_owned(),
            quantity: *quantity,
            unit_price: Decimal::from(*unit_price),
            subtotal: Decimal::from(*unit_price) * Decimal::from(*quantity),
        })
        .collect::<Vec<_>>();

    Sale {
        id,
        customer_id: id + 1000,
        customer_username: customer.to_owned(),
        created_at,
        total: lines.iter().map(|line| line.subtotal).sum(),
        status: SaleStatus::Pagado,
        lines,
    }
}

#[derive(Default)]
pub(crate) struct MemoryDocumentStore {
    pub(crate) files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> AppResult<String> {
        self.files.lock().await.insert(key.to_owned(), bytes.to_vec());
        Ok(key.to_owned())
    }

    async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("archivo {path} no encontrado")))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.files.lock().await.remove(path);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalogRepository {
    pub(crate) brands: Mutex<Vec<Brand>>,
    pub(crate) categories: Mutex<Vec<Category>>,
    pub(crate) products: Mutex<Vec<Product>>,
}

impl FakeCatalogRepository {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    pub(crate) async fn product(&self, product_id: i64) -> Option<Product> {
        self.products
            .lock()
            .await
            .iter()
            .find(|product| product.id == product_id)
            .cloned()
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or_default() + 1
}

#[async_trait]
impl CatalogRepository for FakeCatalogRepository {
    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        Ok(self.brands.lock().await.clone())
    }

    async fn find_brand(&self, brand_id: i64) -> AppResult<Option<Brand>> {
        Ok(self
            .brands
            .lock()
            .await
            .iter()
            .find(|brand| brand.id == brand_id)
            .cloned())
    }

    async fn create_brand(&self, name: &str) -> AppResult<Brand> {
        let mut brands = self.brands.lock().await;
        if brands.iter().any(|brand| brand.name == name) {
            return Err(AppError::Conflict(format!("la marca '{name}' ya existe")));
        }
        let brand = Brand {
            id: next_id(brands.iter().map(|brand| brand.id)),
            name: name.to_owned(),
        };
        brands.push(brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, brand_id: i64, name: &str) -> AppResult<Brand> {
        let mut brands = self.brands.lock().await;
        let brand = brands
            .iter_mut()
            .find(|brand| brand.id == brand_id)
            .ok_or_else(|| AppError::NotFound(format!("marca {brand_id}")))?;
        brand.name = name.to_owned();
        Ok(brand.clone())
    }

    async fn delete_brand(&self, brand_id: i64) -> AppResult<()> {
        self.brands.lock().await.retain(|brand| brand.id != brand_id);
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.lock().await.clone())
    }

    async fn find_category(&self, category_id: i64) -> AppResult<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .find(|category| category.id == category_id)
            .cloned())
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        let mut categories = self.categories.lock().await;
        let category = Category {
            id: next_id(categories.iter().map(|category| category.id)),
            name: name.to_owned(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, category_id: i64, name: &str) -> AppResult<Category> {
        let mut categories = self.categories.lock().await;
        let category = categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| AppError::NotFound(format!("categoría {category_id}")))?;
        category.name = name.to_owned();
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: i64) -> AppResult<()> {
        self.categories
            .lock()
            .await
            .retain(|category| category.id != category_id);
        Ok(())
    }

    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .filter(|product| query.active.is_none_or(|active| product.active == active))
            .filter(|product| {
                query.search.as_deref().is_none_or(|search| {
                    product.name.to_lowercase().contains(&search.to_lowercase())
                })
            })
            .cloned()
            .collect())
    }

    async fn find_product(&self, product_id: i64) -> AppResult<Option<Product>> {
        Ok(self.product(product_id).await)
    }

    async fn create_product(&self, draft: ProductDraft) -> AppResult<Product> {
        let mut products = self.products.lock().await;
        let mut created = product(
            next_id(products.iter().map(|product| product.id)),
            draft.name.as_str(),
            0,
            draft.stock,
        );
        created.price = draft.price;
        created.description = draft.description;
        created.warranty_months = draft.warranty_months;
        created.active = draft.active;
        products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, product_id: i64, draft: ProductDraft) -> AppResult<Product> {
        let mut products = self.products.lock().await;
        let existing = products
            .iter_mut()
            .find(|product| product.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id}")))?;
        existing.name = draft.name.into();
        existing.price = draft.price;
        existing.stock = draft.stock;
        existing.active = draft.active;
        Ok(existing.clone())
    }

    async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        self.products
            .lock()
            .await
            .retain(|product| product.id != product_id);
        Ok(())
    }

    async fn set_product_discount(
        &self,
        product_id: i64,
        discount: Option<ProductDiscount>,
    ) -> AppResult<Product> {
        let mut products = self.products.lock().await;
        let existing = products
            .iter_mut()
            .find(|product| product.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id}")))?;
        existing.discount = discount;
        Ok(existing.clone())
    }
}
