use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{Brand, Category, Product, ProductDiscount, ProductDraft};
use ts_rs::TS;

use super::common::{date, money, timestamp};

const DEFAULT_WARRANTY_MONTHS: i32 = 12;

/// Incoming payload for brand and category writes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/named-resource-request.ts"
)]
pub struct NamedResourceRequest {
    pub nombre: String,
}

/// API representation of a brand.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/brand-response.ts"
)]
pub struct BrandResponse {
    pub id: i64,
    pub nombre: String,
}

/// API representation of a category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/category-response.ts"
)]
pub struct CategoryResponse {
    pub id: i64,
    pub nombre: String,
}

/// Incoming payload for product create and update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-request.ts"
)]
pub struct ProductRequest {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[ts(type = "string")]
    pub precio: Decimal,
    pub stock: i32,
    pub garantia: Option<i32>,
    pub marca: Option<i64>,
    pub categoria: Option<i64>,
    pub imagen: Option<String>,
    pub estado: Option<bool>,
}

/// Incoming payload for the product discount window; all fields empty clears it.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-discount-request.ts"
)]
pub struct ProductDiscountRequest {
    #[ts(type = "string | null")]
    pub descuento: Option<Decimal>,
    #[ts(type = "string | null")]
    pub fecha_inicio_descuento: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub fecha_fin_descuento: Option<NaiveDate>,
}

/// API representation of a product.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-response.ts"
)]
pub struct ProductResponse {
    pub id: i64,
    pub nombre: String,
    pub descripcion: String,
    pub precio: String,
    pub precio_con_descuento: String,
    pub stock: i32,
    pub marca: Option<i64>,
    pub marca_nombre: Option<String>,
    pub categoria: Option<i64>,
    pub categoria_nombre: Option<String>,
    pub imagen: Option<String>,
    pub estado: bool,
    pub garantia: i32,
    pub fecha_creacion: String,
    pub descuento: Option<String>,
    pub fecha_inicio_descuento: Option<String>,
    pub fecha_fin_descuento: Option<String>,
}

impl ProductRequest {
    pub fn into_draft(self) -> AppResult<ProductDraft> {
        ProductDraft::new(
            self.nombre,
            self.descripcion,
            self.precio,
            self.stock,
            self.garantia.unwrap_or(DEFAULT_WARRANTY_MONTHS),
            self.marca,
            self.categoria,
            self.imagen,
            self.estado.unwrap_or(true),
        )
    }
}

impl ProductDiscountRequest {
    pub fn into_discount(self) -> AppResult<Option<ProductDiscount>> {
        match (
            self.descuento,
            self.fecha_inicio_descuento,
            self.fecha_fin_descuento,
        ) {
            (None, None, None) => Ok(None),
            (Some(percentage), Some(starts_on), Some(ends_on)) => Ok(Some(ProductDiscount {
                percentage,
                starts_on,
                ends_on,
            })),
            _ => Err(AppError::Validation(
                "el descuento requiere porcentaje, fecha de inicio y fecha de fin".to_owned(),
            )),
        }
    }
}

impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id,
            nombre: brand.name,
        }
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            nombre: category.name,
        }
    }
}

impl ProductResponse {
    /// Builds the payload with the price in force on `today`.
    pub fn from_product(product: Product, today: NaiveDate) -> Self {
        let precio_con_descuento = money(product.effective_price(today));
        Self {
            id: product.id,
            nombre: product.name,
            descripcion: product.description,
            precio: money(product.price),
            precio_con_descuento,
            stock: product.stock,
            marca: product.brand.as_ref().map(|brand| brand.id),
            marca_nombre: product.brand.map(|brand| brand.name),
            categoria: product.category.as_ref().map(|category| category.id),
            categoria_nombre: product.category.map(|category| category.name),
            imagen: product.image_url,
            estado: product.active,
            garantia: product.warranty_months,
            fecha_creacion: timestamp(product.created_at),
            descuento: product.discount.map(|discount| money(discount.percentage)),
            fecha_inicio_descuento: product.discount.map(|discount| date(discount.starts_on)),
            fecha_fin_descuento: product.discount.map(|discount| date(discount.ends_on)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use smartsales_core::AppError;

    use super::ProductDiscountRequest;

    #[test]
    fn discount_window_must_be_complete_or_empty() {
        let empty = ProductDiscountRequest {
            descuento: None,
            fecha_inicio_descuento: None,
            fecha_fin_descuento: None,
        };
        let partial = ProductDiscountRequest {
            descuento: Some(Decimal::from(10)),
            fecha_inicio_descuento: NaiveDate::from_ymd_opt(2025, 1, 1),
            fecha_fin_descuento: None,
        };

        assert!(matches!(empty.into_discount(), Ok(None)));
        assert!(matches!(
            partial.into_discount(),
            Err(AppError::Validation(_))
        ));
    }
}
