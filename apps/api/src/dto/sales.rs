use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_application::{
    DailySales, PaymentIntent, ProductSalesRank, PurchaseSummary, SalesStatistics,
};
use smartsales_domain::{Sale, SaleLine, SaleLineRequest as DomainSaleLineRequest, Warranty};
use ts_rs::TS;

use super::common::{date, money, timestamp};

/// Incoming payload for a card payment intent.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/payment-intent-request.ts"
)]
pub struct PaymentIntentRequest {
    #[ts(type = "string | number | null")]
    pub monto: Option<Decimal>,
}

/// Client secret handed to the checkout widget.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/payment-intent-response.ts"
)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// One requested sale line.
#[derive(Debug, Clone, Copy, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sale-line-request.ts"
)]
pub struct SaleLineRequest {
    pub producto_id: i64,
    pub cantidad: i32,
}

/// Incoming payload for sale registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-sale-request.ts"
)]
pub struct RegisterSaleRequest {
    #[serde(default)]
    pub productos: Vec<SaleLineRequest>,
    #[ts(type = "string | number")]
    pub total: Decimal,
}

/// Incoming payload for a sale status change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-sale-status-request.ts"
)]
pub struct UpdateSaleStatusRequest {
    pub estado: String,
}

/// API representation of a sale line.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sale-line-response.ts"
)]
pub struct SaleLineResponse {
    pub id: i64,
    pub producto: i64,
    pub producto_nombre: String,
    pub cantidad: i32,
    pub precio_unitario: String,
    pub subtotal: String,
}

/// API representation of a sale.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sale-response.ts"
)]
pub struct SaleResponse {
    pub id: i64,
    pub usuario: i64,
    pub usuario_nombre: String,
    pub fecha: String,
    pub total: String,
    pub estado: String,
    pub detalles: Vec<SaleLineResponse>,
}

/// Sale registration result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/registered-sale-response.ts"
)]
pub struct RegisteredSaleResponse {
    pub mensaje: String,
    pub venta: SaleResponse,
    pub nota_venta: String,
}

/// API representation of a warranty.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/warranty-response.ts"
)]
pub struct WarrantyResponse {
    pub id: i64,
    pub producto: i64,
    pub producto_nombre: String,
    pub venta: i64,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub estado: String,
}

/// Caller purchase summary.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/purchase-summary-response.ts"
)]
pub struct PurchaseSummaryResponse {
    pub total_gastado: String,
    pub cantidad_compras: usize,
    pub ticket_promedio: String,
    pub compras: Vec<SaleResponse>,
}

/// Best-selling product row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/top-product-response.ts"
)]
pub struct TopProductResponse {
    pub producto_id: i64,
    pub producto: String,
    pub cantidad_vendida: i64,
    pub ingresos: String,
}

/// Sales bucket for one day.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/daily-sales-response.ts"
)]
pub struct DailySalesResponse {
    pub fecha: String,
    pub cantidad: usize,
    pub total: String,
}

/// Sales statistics for a period.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sales-statistics-response.ts"
)]
pub struct SalesStatisticsResponse {
    pub periodo: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub total_ventas: String,
    pub cantidad_ventas: usize,
    pub ticket_promedio: String,
    pub productos_mas_vendidos: Vec<TopProductResponse>,
    pub ventas_por_dia: Vec<DailySalesResponse>,
}

impl From<SaleLineRequest> for DomainSaleLineRequest {
    fn from(line: SaleLineRequest) -> Self {
        Self {
            product_id: line.producto_id,
            quantity: line.cantidad,
        }
    }
}

impl From<PaymentIntent> for PaymentIntentResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            client_secret: intent.client_secret,
        }
    }
}

impl From<SaleLine> for SaleLineResponse {
    fn from(line: SaleLine) -> Self {
        Self {
            id: line.id,
            producto: line.product_id,
            producto_nombre: line.product_name,
            cantidad: line.quantity,
            precio_unitario: money(line.unit_price),
            subtotal: money(line.subtotal),
        }
    }
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            usuario: sale.customer_id,
            usuario_nombre: sale.customer_username,
            fecha: timestamp(sale.created_at),
            total: money(sale.total),
            estado: sale.status.as_str().to_owned(),
            detalles: sale.lines.into_iter().map(SaleLineResponse::from).collect(),
        }
    }
}

impl From<Warranty> for WarrantyResponse {
    fn from(warranty: Warranty) -> Self {
        Self {
            id: warranty.id,
            producto: warranty.product_id,
            producto_nombre: warranty.product_name,
            venta: warranty.sale_id,
            fecha_inicio: date(warranty.starts_on),
            fecha_fin: date(warranty.ends_on),
            estado: warranty.status.as_str().to_owned(),
        }
    }
}

impl From<PurchaseSummary> for PurchaseSummaryResponse {
    fn from(summary: PurchaseSummary) -> Self {
        Self {
            total_gastado: money(summary.total_spent),
            cantidad_compras: summary.purchases,
            ticket_promedio: money(summary.average_ticket),
            compras: summary.sales.into_iter().map(SaleResponse::from).collect(),
        }
    }
}

impl From<ProductSalesRank> for TopProductResponse {
    fn from(rank: ProductSalesRank) -> Self {
        Self {
            producto_id: rank.product_id,
            producto: rank.product_name,
            cantidad_vendida: rank.units,
            ingresos: money(rank.revenue),
        }
    }
}

impl From<DailySales> for DailySalesResponse {
    fn from(day: DailySales) -> Self {
        Self {
            fecha: date(day.day),
            cantidad: day.sales,
            total: money(day.total),
        }
    }
}

impl From<SalesStatistics> for SalesStatisticsResponse {
    fn from(statistics: SalesStatistics) -> Self {
        Self {
            periodo: statistics.period.as_str().to_owned(),
            fecha_inicio: date(statistics.starts_on),
            fecha_fin: date(statistics.ends_on),
            total_ventas: money(statistics.total_revenue),
            cantidad_ventas: statistics.sales_count,
            ticket_promedio: money(statistics.average_ticket),
            productos_mas_vendidos: statistics
                .top_products
                .into_iter()
                .map(TopProductResponse::from)
                .collect(),
            ventas_por_dia: statistics
                .daily
                .into_iter()
                .map(DailySalesResponse::from)
                .collect(),
        }
    }
}
