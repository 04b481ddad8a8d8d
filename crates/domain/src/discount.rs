use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_core::{AppError, AppResult};

use crate::catalog::apply_percentage_discount;

/// Time-bounded percentage discount, optionally tied to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Stable identifier.
    pub id: i64,
    /// Discounted product.
    pub product_id: Option<i64>,
    /// Discounted product name.
    pub product_name: Option<String>,
    /// Percentage in `(0, 100]`.
    pub percentage: Decimal,
    /// First day the discount applies.
    pub starts_on: NaiveDate,
    /// Last day the discount applies.
    pub ends_on: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Manual on/off switch.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Discount {
    /// Active and inside its window on `today`.
    #[must_use]
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.active && self.starts_on <= today && today <= self.ends_on
    }

    /// Price after this discount, or `price` unchanged when it is not current.
    #[must_use]
    pub fn discounted_price(&self, price: Decimal, today: NaiveDate) -> Decimal {
        if self.is_current(today) {
            apply_percentage_discount(price, self.percentage)
        } else {
            price
        }
    }
}

/// Validated discount attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountDraft {
    /// Discounted product.
    pub product_id: Option<i64>,
    /// Percentage in `(0, 100]`.
    pub percentage: Decimal,
    /// First day.
    pub starts_on: NaiveDate,
    /// Last day.
    pub ends_on: NaiveDate,
    /// Description.
    pub description: String,
    /// Manual on/off switch.
    pub active: bool,
}

impl DiscountDraft {
    /// Validates percentage bounds and the date window.
    pub fn new(
        product_id: Option<i64>,
        percentage: Decimal,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        description: impl Into<String>,
        active: bool,
    ) -> AppResult<Self> {
        if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(AppError::Validation(
                "el porcentaje debe estar entre 0 y 100".to_owned(),
            ));
        }
        if ends_on < starts_on {
            return Err(AppError::Validation(
                "la fecha de fin no puede ser anterior a la fecha de inicio".to_owned(),
            ));
        }

        Ok(Self {
            product_id,
            percentage,
            starts_on,
            ends_on,
            description: description.into(),
            active,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{Discount, DiscountDraft};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    #[test]
    fn inactive_discount_leaves_price_unchanged() {
        let discount = Discount {
            id: 1,
            product_id: Some(1),
            product_name: None,
            percentage: Decimal::from(25),
            starts_on: date(2024, 1, 1),
            ends_on: date(2024, 1, 31),
            description: String::new(),
            active: false,
            created_at: Utc::now(),
        };

        assert_eq!(
            discount.discounted_price(Decimal::from(100), date(2024, 1, 10)),
            Decimal::from(100)
        );
        let enabled = Discount {
            active: true,
            ..discount
        };
        assert_eq!(
            enabled.discounted_price(Decimal::from(100), date(2024, 1, 10)),
            Decimal::from(75)
        );
    }

    #[test]
    fn draft_rejects_inverted_window_and_out_of_range_percentage() {
        assert!(
            DiscountDraft::new(None, Decimal::from(10), date(2024, 2, 1), date(2024, 1, 1), "", true)
                .is_err()
        );
        assert!(
            DiscountDraft::new(None, Decimal::from(101), date(2024, 1, 1), date(2024, 1, 2), "", true)
                .is_err()
        );
    }
}
