use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_core::{AppError, AppResult, NonEmptyString};

/// Product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Stable identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Time-bounded percentage discount copied onto a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDiscount {
    /// Percentage in the `(0, 100]` range.
    pub percentage: Decimal,
    /// First day the discount applies.
    pub starts_on: NaiveDate,
    /// Last day the discount applies.
    pub ends_on: NaiveDate,
}

impl ProductDiscount {
    /// Returns whether the discount window includes `today`.
    #[must_use]
    pub fn applies_on(&self, today: NaiveDate) -> bool {
        self.starts_on <= today && today <= self.ends_on
    }
}

/// Sellable catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Base unit price.
    pub price: Decimal,
    /// Units available.
    pub stock: i32,
    /// Warranty duration granted per sold unit, in months.
    pub warranty_months: i32,
    /// Optional brand reference.
    pub brand: Option<Brand>,
    /// Optional category reference.
    pub category: Option<Category>,
    /// Optional image location.
    pub image_url: Option<String>,
    /// Whether the product is listed.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Discount currently copied onto the product.
    pub discount: Option<ProductDiscount>,
}

impl Product {
    /// Price charged on `today`, applying the product discount when its window is open.
    #[must_use]
    pub fn effective_price(&self, today: NaiveDate) -> Decimal {
        match self.discount {
            Some(discount) if discount.applies_on(today) => {
                apply_percentage_discount(self.price, discount.percentage)
            }
            _ => self.price,
        }
    }

    /// Stock valued at the base price.
    #[must_use]
    pub fn inventory_value(&self) -> Decimal {
        self.price * Decimal::from(self.stock)
    }

    /// Brand name or an empty string.
    #[must_use]
    pub fn brand_name(&self) -> &str {
        self.brand.as_ref().map_or("", |brand| brand.name.as_str())
    }

    /// Category name or an empty string.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or("", |category| category.name.as_str())
    }
}

/// Validated product attributes used for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display name.
    pub name: NonEmptyString,
    /// Free-text description.
    pub description: String,
    /// Base unit price.
    pub price: Decimal,
    /// Units available.
    pub stock: i32,
    /// Warranty months per unit.
    pub warranty_months: i32,
    /// Optional brand reference.
    pub brand_id: Option<i64>,
    /// Optional category reference.
    pub category_id: Option<i64>,
    /// Optional image location.
    pub image_url: Option<String>,
    /// Whether the product is listed.
    pub active: bool,
}

impl ProductDraft {
    /// Validates the product attributes.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: i32,
        warranty_months: i32,
        brand_id: Option<i64>,
        category_id: Option<i64>,
        image_url: Option<String>,
        active: bool,
    ) -> AppResult<Self> {
        if price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "el precio debe ser mayor a cero".to_owned(),
            ));
        }
        if stock < 0 {
            return Err(AppError::Validation(
                "el stock no puede ser negativo".to_owned(),
            ));
        }
        if warranty_months < 0 {
            return Err(AppError::Validation(
                "la garantía no puede ser negativa".to_owned(),
            ));
        }

        Ok(Self {
            name: NonEmptyString::new(name)?,
            description: description.into(),
            price,
            stock,
            warranty_months,
            brand_id,
            category_id,
            image_url: image_url.filter(|value| !value.trim().is_empty()),
            active,
        })
    }
}

/// Applies a percentage discount and rounds to cents.
#[must_use]
pub fn apply_percentage_discount(price: Decimal, percentage: Decimal) -> Decimal {
    let factor = Decimal::ONE - percentage / Decimal::ONE_HUNDRED;
    (price * factor).round_dp(2)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{Product, ProductDiscount, ProductDraft};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    fn product(discount: Option<ProductDiscount>) -> Product {
        Product {
            id: 1,
            name: "Refrigerador".to_owned(),
            description: String::new(),
            price: Decimal::new(150_000, 2),
            stock: 4,
            warranty_months: 12,
            brand: None,
            category: None,
            image_url: None,
            active: true,
            created_at: Utc::now(),
            discount,
        }
    }

    #[test]
    fn effective_price_applies_discount_inside_window_only() {
        let product = product(Some(ProductDiscount {
            percentage: Decimal::from(10),
            starts_on: date(2024, 5, 1),
            ends_on: date(2024, 5, 31),
        }));

        assert_eq!(
            product.effective_price(date(2024, 5, 15)),
            Decimal::new(135_000, 2)
        );
        assert_eq!(
            product.effective_price(date(2024, 6, 1)),
            Decimal::new(150_000, 2)
        );
    }

    #[test]
    fn inventory_value_multiplies_price_by_stock() {
        assert_eq!(product(None).inventory_value(), Decimal::new(600_000, 2));
    }

    #[test]
    fn draft_rejects_non_positive_price_and_negative_stock() {
        let zero_price = ProductDraft::new(
            "TV", "", Decimal::ZERO, 1, 0, None, None, None, true,
        );
        let negative_stock = ProductDraft::new(
            "TV",
            "",
            Decimal::ONE,
            -1,
            0,
            None,
            None,
            None,
            true,
        );

        assert!(zero_price.is_err());
        assert!(negative_stock.is_err());
    }
}
