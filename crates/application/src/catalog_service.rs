use std::sync::Arc;

use rust_decimal::Decimal;
use smartsales_core::{ActorContext, AppError, AppResult, NonEmptyString};
use smartsales_domain::{Brand, Category, Product, ProductDiscount, ProductDraft};

use crate::{AuditRecorder, CatalogRepository, ProductQuery};

#[cfg(test)]
mod tests;

/// Application service for brands, categories and products.
#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
    audit: AuditRecorder,
}

impl CatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(repository: Arc<dyn CatalogRepository>, audit: AuditRecorder) -> Self {
        Self { repository, audit }
    }

    /// Lists brands by name.
    pub async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        self.repository.list_brands().await
    }

    /// Returns one brand.
    pub async fn get_brand(&self, brand_id: i64) -> AppResult<Brand> {
        self.repository
            .find_brand(brand_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("marca {brand_id} no encontrada")))
    }

    /// Creates a brand.
    pub async fn create_brand(&self, actor: &ActorContext, name: &str) -> AppResult<Brand> {
        actor.require_admin()?;
        let name = NonEmptyString::new(name)?;

        self.audit
            .audited(
                actor,
                &format!("Crear marca: {name}"),
                self.repository.create_brand(name.as_str()),
                |brand: &Brand| format!("Creó marca: {}", brand.name),
            )
            .await
    }

    /// Renames a brand.
    pub async fn update_brand(
        &self,
        actor: &ActorContext,
        brand_id: i64,
        name: &str,
    ) -> AppResult<Brand> {
        actor.require_admin()?;
        let name = NonEmptyString::new(name)?;

        self.audit
            .audited(
                actor,
                &format!("Actualizar marca #{brand_id}"),
                self.repository.update_brand(brand_id, name.as_str()),
                |brand: &Brand| format!("Actualizó marca: {}", brand.name),
            )
            .await
    }

    /// Deletes a brand.
    pub async fn delete_brand(&self, actor: &ActorContext, brand_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        let brand = self.get_brand(brand_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar marca: {}", brand.name),
                self.repository.delete_brand(brand_id),
                |_| format!("Eliminó marca: {}", brand.name),
            )
            .await
    }

    /// Lists categories by name.
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    /// Returns one category.
    pub async fn get_category(&self, category_id: i64) -> AppResult<Category> {
        self.repository
            .find_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("categoría {category_id} no encontrada")))
    }

    /// Creates a category.
    pub async fn create_category(&self, actor: &ActorContext, name: &str) -> AppResult<Category> {
        actor.require_admin()?;
        let name = NonEmptyString::new(name)?;

        self.audit
            .audited(
                actor,
                &format!("Crear categoría: {name}"),
                self.repository.create_category(name.as_str()),
                |category: &Category| format!("Creó categoría: {}", category.name),
            )
            .await
    }

    /// Renames a category.
    pub async fn update_category(
        &self,
        actor: &ActorContext,
        category_id: i64,
        name: &str,
    ) -> AppResult<Category> {
        actor.require_admin()?;
        let name = NonEmptyString::new(name)?;

        self.audit
            .audited(
                actor,
                &format!("Actualizar categoría #{category_id}"),
                self.repository.update_category(category_id, name.as_str()),
                |category: &Category| format!("Actualizó categoría: {}", category.name),
            )
            .await
    }

    /// Deletes a category.
    pub async fn delete_category(&self, actor: &ActorContext, category_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        let category = self.get_category(category_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar categoría: {}", category.name),
                self.repository.delete_category(category_id),
                |_| format!("Eliminó categoría: {}", category.name),
            )
            .await
    }

    /// Lists products matching `query`.
    pub async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        let query = ProductQuery {
            search: query
                .search
                .map(|search| search.trim().to_owned())
                .filter(|search| !search.is_empty()),
            ..query
        };
        self.repository.list_products(query).await
    }

    /// Returns one product.
    pub async fn get_product(&self, product_id: i64) -> AppResult<Product> {
        self.repository
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id} no encontrado")))
    }

    /// Creates a product.
    pub async fn create_product(
        &self,
        actor: &ActorContext,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        actor.require_admin()?;
        self.ensure_references_exist(&draft).await?;

        self.audit
            .audited(
                actor,
                &format!("Crear producto: {}", draft.name),
                self.repository.create_product(draft.clone()),
                |product: &Product| format!("Creó producto: {}", product.name),
            )
            .await
    }

    /// Replaces a product's attributes.
    pub async fn update_product(
        &self,
        actor: &ActorContext,
        product_id: i64,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        actor.require_admin()?;
        self.get_product(product_id).await?;
        self.ensure_references_exist(&draft).await?;

        self.audit
            .audited(
                actor,
                &format!("Actualizar producto #{product_id}"),
                self.repository.update_product(product_id, draft),
                |product: &Product| format!("Actualizó producto: {}", product.name),
            )
            .await
    }

    /// Deletes a product.
    pub async fn delete_product(&self, actor: &ActorContext, product_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        let product = self.get_product(product_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar producto: {}", product.name),
                self.repository.delete_product(product_id),
                |_| format!("Eliminó producto: {}", product.name),
            )
            .await
    }

    /// Sets or clears the discount window copied onto a product.
    pub async fn set_product_discount(
        &self,
        actor: &ActorContext,
        product_id: i64,
        discount: Option<ProductDiscount>,
    ) -> AppResult<Product> {
        actor.require_admin()?;
        if let Some(discount) = &discount {
            validate_product_discount(discount)?;
        }
        self.get_product(product_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Actualizar descuento del producto #{product_id}"),
                self.repository.set_product_discount(product_id, discount),
                |product: &Product| match &product.discount {
                    Some(discount) => format!(
                        "Aplicó descuento de {}% a producto: {}",
                        discount.percentage, product.name
                    ),
                    None => format!("Quitó descuento de producto: {}", product.name),
                },
            )
            .await
    }

    async fn ensure_references_exist(&self, draft: &ProductDraft) -> AppResult<()> {
        if let Some(brand_id) = draft.brand_id {
            self.get_brand(brand_id).await?;
        }
        if let Some(category_id) = draft.category_id {
            self.get_category(category_id).await?;
        }
        Ok(())
    }
}

fn validate_product_discount(discount: &ProductDiscount) -> AppResult<()> {
    if discount.percentage <= Decimal::ZERO || discount.percentage > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "el porcentaje debe estar entre 0 y 100".to_owned(),
        ));
    }
    if discount.ends_on < discount.starts_on {
        return Err(AppError::Validation(
            "la fecha de fin no puede ser anterior a la fecha de inicio".to_owned(),
        ));
    }
    Ok(())
}
