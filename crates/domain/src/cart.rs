use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stable identifier.
    pub id: i64,
    /// Product in the cart.
    pub product_id: i64,
    /// Product name.
    pub product_name: String,
    /// Current product price.
    pub unit_price: Decimal,
    /// Units requested.
    pub quantity: i32,
}

impl CartLine {
    /// `quantity * unit_price`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Active shopping cart owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Stable identifier.
    pub id: i64,
    /// Owner.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the cart is still open.
    pub active: bool,
    /// Lines.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}
