use std::sync::Arc;

use smartsales_core::{ActorContext, AppError, AppResult};
use smartsales_domain::Cart;

use crate::{AuditRecorder, CartRepository, CatalogRepository};

/// Application service for the caller's active cart.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
    audit: AuditRecorder,
}

impl CartService {
    /// Creates a new cart service.
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartRepository>,
        catalog: Arc<dyn CatalogRepository>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            carts,
            catalog,
            audit,
        }
    }

    /// Returns the caller's active cart, if any.
    pub async fn active_cart(&self, actor: &ActorContext) -> AppResult<Option<Cart>> {
        self.carts.find_active_cart(actor.user_id()).await
    }

    /// Adds units of a product, creating the cart or incrementing an existing line.
    pub async fn add_product(
        &self,
        actor: &ActorContext,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<Cart> {
        if quantity <= 0 {
            return Err(AppError::Validation(
                "la cantidad debe ser mayor a cero".to_owned(),
            ));
        }
        let product = self
            .catalog
            .find_product(product_id)
            .await?
            .filter(|product| product.active)
            .ok_or_else(|| AppError::NotFound(format!("producto {product_id} no encontrado")))?;

        self.audit
            .audited(
                actor,
                &format!("Agregar producto {} al carrito", product.name),
                self.carts.add_item(actor.user_id(), product_id, quantity),
                |_| format!("Agregó {quantity} x {} al carrito", product.name),
            )
            .await
    }

    /// Empties and closes the caller's active cart.
    pub async fn clear(&self, actor: &ActorContext) -> AppResult<()> {
        let cleared = self.carts.clear_active_cart(actor.user_id()).await?;
        if !cleared {
            return Err(AppError::NotFound(
                "no hay un carrito activo".to_owned(),
            ));
        }

        self.audit.record(actor, "Vació el carrito", true).await;
        Ok(())
    }
}
