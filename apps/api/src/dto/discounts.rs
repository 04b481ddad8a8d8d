use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_application::ProductPriceQuote;
use smartsales_core::AppResult;
use smartsales_domain::{Discount, DiscountDraft};
use ts_rs::TS;

use super::catalog::ProductResponse;
use super::common::{date, money, timestamp};

/// Incoming payload for discount create and update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/discount-request.ts"
)]
pub struct DiscountRequest {
    pub producto: Option<i64>,
    #[ts(type = "string | number")]
    pub porcentaje: Decimal,
    #[ts(type = "string")]
    pub fecha_inicio: NaiveDate,
    #[ts(type = "string")]
    pub fecha_fin: NaiveDate,
    #[serde(default)]
    pub descripcion: String,
    pub activo: Option<bool>,
}

/// API representation of a discount.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/discount-response.ts"
)]
pub struct DiscountResponse {
    pub id: i64,
    pub producto: Option<i64>,
    pub producto_nombre: Option<String>,
    pub porcentaje: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub descripcion: String,
    pub activo: bool,
    pub fecha_creacion: String,
    pub esta_vigente: bool,
    pub dias_restantes: i64,
}

/// Best current discount for a product.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-price-quote-response.ts"
)]
pub struct ProductPriceQuoteResponse {
    pub producto: ProductResponse,
    pub descuento: Option<DiscountResponse>,
    pub precio_original: String,
    pub precio_con_descuento: String,
    pub ahorro: String,
}

impl DiscountRequest {
    pub fn into_draft(self) -> AppResult<DiscountDraft> {
        DiscountDraft::new(
            self.producto,
            self.porcentaje,
            self.fecha_inicio,
            self.fecha_fin,
            self.descripcion,
            self.activo.unwrap_or(true),
        )
    }
}

impl DiscountResponse {
    /// Builds the payload, deriving validity relative to `today`.
    pub fn from_discount(discount: Discount, today: NaiveDate) -> Self {
        let esta_vigente = discount.is_current(today);
        let dias_restantes = if esta_vigente {
            (discount.ends_on - today).num_days()
        } else {
            0
        };

        Self {
            id: discount.id,
            producto: discount.product_id,
            producto_nombre: discount.product_name,
            porcentaje: money(discount.percentage),
            fecha_inicio: date(discount.starts_on),
            fecha_fin: date(discount.ends_on),
            descripcion: discount.description,
            activo: discount.active,
            fecha_creacion: timestamp(discount.created_at),
            esta_vigente,
            dias_restantes,
        }
    }
}

impl ProductPriceQuoteResponse {
    pub fn from_quote(quote: ProductPriceQuote, today: NaiveDate) -> Self {
        Self {
            producto: ProductResponse::from_product(quote.product, today),
            descuento: quote
                .discount
                .map(|discount| DiscountResponse::from_discount(discount, today)),
            precio_original: money(quote.original_price),
            precio_con_descuento: money(quote.discounted_price),
            ahorro: money(quote.savings),
        }
    }
}
