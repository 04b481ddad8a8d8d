use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use smartsales_core::{ActorContext, AppError, AppResult};
use smartsales_domain::{Discount, DiscountDraft, Product, ProductDiscount};
use tracing::info;

use crate::{AuditRecorder, CatalogRepository, DiscountRepository};

#[cfg(test)]
mod tests;

/// Best current discount for a product with the resulting prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPriceQuote {
    /// Quoted product.
    pub product: Product,
    /// Highest current discount, if any.
    pub discount: Option<Discount>,
    /// Base price.
    pub original_price: Decimal,
    /// Price after the discount.
    pub discounted_price: Decimal,
    /// `original_price - discounted_price`.
    pub savings: Decimal,
}

/// Application service for discount campaigns.
///
/// Active discounts tied to a product are mirrored onto the product so
/// catalog prices reflect them without a join.
#[derive(Clone)]
pub struct DiscountService {
    discounts: Arc<dyn DiscountRepository>,
    catalog: Arc<dyn CatalogRepository>,
    audit: AuditRecorder,
}

impl DiscountService {
    /// Creates a new discount service.
    #[must_use]
    pub fn new(
        discounts: Arc<dyn DiscountRepository>,
        catalog: Arc<dyn CatalogRepository>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            discounts,
            catalog,
            audit,
        }
    }

    /// Lists every discount.
    pub async fn list(&self) -> AppResult<Vec<Discount>> {
        self.discounts.list_discounts().await
    }

    /// Returns one discount.
    pub async fn get(&self, discount_id: i64) -> AppResult<Discount> {
        self.discounts
            .find_discount(discount_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("descuento {discount_id} no encontrado")))
    }

    /// Discounts active today.
    pub async fn current(&self) -> AppResult<Vec<Discount>> {
        self.discounts.list_current(Utc::now().date_naive()).await
    }

    /// Quotes a product with its best current discount.
    pub async fn quote_product(&self, product_id: i64) -> AppResult<ProductPriceQuote> {
        let product = self
            .catalog
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id} no encontrado")))?;
        let today = Utc::now().date_naive();

        let discount = self
            .discounts
            .list_for_product(product_id)
            .await?
            .into_iter()
            .filter(|discount| discount.is_current(today))
            .max_by(|left, right| left.percentage.cmp(&right.percentage));

        Ok(price_quote(product, discount, today))
    }

    /// Creates a discount.
    pub async fn create(&self, actor: &ActorContext, draft: DiscountDraft) -> AppResult<Discount> {
        actor.require_admin()?;
        self.ensure_product(draft.product_id).await?;

        let discount = self
            .audit
            .audited(
                actor,
                "Crear descuento",
                self.discounts.create_discount(draft),
                |discount: &Discount| {
                    format!(
                        "Creó descuento de {}% para {}",
                        discount.percentage,
                        target_label(discount)
                    )
                },
            )
            .await?;

        self.sync_product(&discount).await?;
        Ok(discount)
    }

    /// Replaces a discount's attributes.
    pub async fn update(
        &self,
        actor: &ActorContext,
        discount_id: i64,
        draft: DiscountDraft,
    ) -> AppResult<Discount> {
        actor.require_admin()?;
        let previous = self.get(discount_id).await?;
        self.ensure_product(draft.product_id).await?;

        let discount = self
            .audit
            .audited(
                actor,
                &format!("Actualizar descuento #{discount_id}"),
                self.discounts.update_discount(discount_id, draft),
                |discount: &Discount| {
                    format!(
                        "Actualizó descuento #{} ({}%)",
                        discount.id, discount.percentage
                    )
                },
            )
            .await?;

        if previous.product_id != discount.product_id {
            if let Some(product_id) = previous.product_id {
                self.catalog.set_product_discount(product_id, None).await?;
            }
        }
        self.sync_product(&discount).await?;
        Ok(discount)
    }

    /// Deletes a discount and restores the product's base price fields.
    pub async fn delete(&self, actor: &ActorContext, discount_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        let discount = self.get(discount_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar descuento #{discount_id}"),
                self.discounts.delete_discount(discount_id),
                |_| {
                    format!(
                        "Eliminó descuento de {}% para {}",
                        discount.percentage,
                        target_label(&discount)
                    )
                },
            )
            .await?;

        if let Some(product_id) = discount.product_id {
            self.catalog.set_product_discount(product_id, None).await?;
        }
        Ok(())
    }

    /// Switches a discount on or off.
    pub async fn set_active(
        &self,
        actor: &ActorContext,
        discount_id: i64,
        active: bool,
    ) -> AppResult<Discount> {
        actor.require_admin()?;
        self.get(discount_id).await?;
        let verb = if active { "Activó" } else { "Desactivó" };

        let discount = self
            .audit
            .audited(
                actor,
                &format!("Cambiar estado de descuento #{discount_id}"),
                self.discounts.set_active(discount_id, active),
                |discount: &Discount| format!("{verb} descuento #{}", discount.id),
            )
            .await?;

        self.sync_product(&discount).await?;
        Ok(discount)
    }

    async fn ensure_product(&self, product_id: Option<i64>) -> AppResult<()> {
        if let Some(product_id) = product_id {
            if self.catalog.find_product(product_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "producto {product_id} no encontrado"
                )));
            }
        }
        Ok(())
    }

    async fn sync_product(&self, discount: &Discount) -> AppResult<()> {
        let Some(product_id) = discount.product_id else {
            return Ok(());
        };

        let mirrored = discount.active.then_some(ProductDiscount {
            percentage: discount.percentage,
            starts_on: discount.starts_on,
            ends_on: discount.ends_on,
        });
        self.catalog
            .set_product_discount(product_id, mirrored)
            .await?;
        info!(
            discount_id = discount.id,
            product_id,
            active = discount.active,
            "product discount synchronized"
        );
        Ok(())
    }
}

fn price_quote(product: Product, discount: Option<Discount>, today: NaiveDate) -> ProductPriceQuote {
    let original_price = product.price;
    let discounted_price = discount
        .as_ref()
        .map_or(original_price, |discount| {
            discount.discounted_price(original_price, today)
        });

    ProductPriceQuote {
        product,
        discount,
        original_price,
        discounted_price,
        savings: original_price - discounted_price,
    }
}

fn target_label(discount: &Discount) -> String {
    discount
        .product_name
        .as_ref()
        .map_or_else(|| "todos los productos".to_owned(), |name| format!("producto {name}"))
}
