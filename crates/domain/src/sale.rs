use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_core::AppError;

/// Sale lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Created but not yet paid.
    Pendiente,
    /// Paid; counts towards revenue.
    Pagado,
    /// Cancelled; stock restored.
    Cancelado,
    /// Delivered to the customer.
    Entregado,
}

impl SaleStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Pagado => "pagado",
            Self::Cancelado => "cancelado",
            Self::Entregado => "entregado",
        }
    }
}

impl Display for SaleStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendiente" => Ok(Self::Pendiente),
            "pagado" => Ok(Self::Pagado),
            "cancelado" => Ok(Self::Cancelado),
            "entregado" => Ok(Self::Entregado),
            _ => Err(AppError::Validation(format!(
                "estado de venta desconocido '{value}'"
            ))),
        }
    }
}

/// Line item of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Stable identifier.
    pub id: i64,
    /// Sold product.
    pub product_id: i64,
    /// Product name at query time.
    pub product_name: String,
    /// Units sold.
    pub quantity: i32,
    /// Unit price charged.
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub subtotal: Decimal,
}

/// Sale order header with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Stable identifier.
    pub id: i64,
    /// Customer that placed the order.
    pub customer_id: i64,
    /// Customer username.
    pub customer_username: String,
    /// Order timestamp.
    pub created_at: DateTime<Utc>,
    /// Order total.
    pub total: Decimal,
    /// Lifecycle state.
    pub status: SaleStatus,
    /// Line items.
    pub lines: Vec<SaleLine>,
}

impl Sale {
    /// Units across all lines.
    #[must_use]
    pub fn units(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Comma separated product names for compact listings.
    #[must_use]
    pub fn product_names(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the sale may be cancelled from its current state.
    pub fn ensure_cancellable(&self) -> Result<(), AppError> {
        if self.status == SaleStatus::Cancelado {
            return Err(AppError::Conflict(format!(
                "la venta #{} ya está cancelada",
                self.id
            )));
        }

        Ok(())
    }
}

/// Requested line for sale registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLineRequest {
    /// Product to sell.
    pub product_id: i64,
    /// Units requested, must be positive.
    pub quantity: i32,
}

/// Warranty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyStatus {
    /// Warranty is in force.
    Activa,
    /// Warranty period is over.
    Caducada,
}

impl WarrantyStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activa => "activa",
            Self::Caducada => "caducada",
        }
    }
}

impl FromStr for WarrantyStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "activa" => Ok(Self::Activa),
            "caducada" => Ok(Self::Caducada),
            _ => Err(AppError::Validation(format!(
                "estado de garantía desconocido '{value}'"
            ))),
        }
    }
}

/// Warranty generated per sold line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warranty {
    /// Stable identifier.
    pub id: i64,
    /// Covered product.
    pub product_id: i64,
    /// Covered product name.
    pub product_name: String,
    /// Originating sale.
    pub sale_id: i64,
    /// First covered day.
    pub starts_on: NaiveDate,
    /// Last covered day.
    pub ends_on: NaiveDate,
    /// Stored state.
    pub status: WarrantyStatus,
}

impl Warranty {
    /// Whether the warranty covers a request made on `today`.
    #[must_use]
    pub fn covers(&self, today: NaiveDate) -> bool {
        self.status == WarrantyStatus::Activa && self.ends_on >= today
    }
}

/// Computes the warranty end date for a sale made on `starts_on`.
#[must_use]
pub fn warranty_end_date(starts_on: NaiveDate, warranty_months: i32) -> NaiveDate {
    let months = u32::try_from(warranty_months.max(0)).unwrap_or(0);
    starts_on
        .checked_add_months(Months::new(months))
        .unwrap_or(starts_on)
}
