use serde::{Deserialize, Serialize};
use smartsales_domain::{Cart, CartLine};
use ts_rs::TS;

use super::common::{money, timestamp};

/// Incoming payload for adding a product to the active cart.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-to-cart-request.ts"
)]
pub struct AddToCartRequest {
    pub producto_id: i64,
    pub cantidad: Option<i32>,
}

/// API representation of a cart line.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cart-line-response.ts"
)]
pub struct CartLineResponse {
    pub id: i64,
    pub producto: i64,
    pub producto_nombre: String,
    pub precio_unitario: String,
    pub cantidad: i32,
    pub subtotal: String,
}

/// API representation of the active cart.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cart-response.ts"
)]
pub struct CartResponse {
    pub id: i64,
    pub usuario: i64,
    pub fecha_creacion: String,
    pub activo: bool,
    pub detalles: Vec<CartLineResponse>,
    pub total: String,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        let subtotal = money(line.subtotal());
        Self {
            id: line.id,
            producto: line.product_id,
            producto_nombre: line.product_name,
            precio_unitario: money(line.unit_price),
            cantidad: line.quantity,
            subtotal,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let total = money(cart.total());
        Self {
            id: cart.id,
            usuario: cart.user_id,
            fecha_creacion: timestamp(cart.created_at),
            activo: cart.active,
            detalles: cart.lines.into_iter().map(CartLineResponse::from).collect(),
            total,
        }
    }
}
