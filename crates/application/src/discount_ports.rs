use async_trait::async_trait;
use chrono::NaiveDate;
use smartsales_core::AppResult;
use smartsales_domain::{Discount, DiscountDraft};

/// Repository port for discounts.
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Lists discounts newest first.
    async fn list_discounts(&self) -> AppResult<Vec<Discount>>;

    /// Finds a discount.
    async fn find_discount(&self, discount_id: i64) -> AppResult<Option<Discount>>;

    /// Creates a discount.
    async fn create_discount(&self, draft: DiscountDraft) -> AppResult<Discount>;

    /// Replaces discount attributes.
    async fn update_discount(&self, discount_id: i64, draft: DiscountDraft) -> AppResult<Discount>;

    /// Deletes a discount.
    async fn delete_discount(&self, discount_id: i64) -> AppResult<()>;

    /// Toggles the manual switch.
    async fn set_active(&self, discount_id: i64, active: bool) -> AppResult<Discount>;

    /// Active discounts whose window includes `today`.
    async fn list_current(&self, today: NaiveDate) -> AppResult<Vec<Discount>>;

    /// Discounts attached to one product.
    async fn list_for_product(&self, product_id: i64) -> AppResult<Vec<Discount>>;
}
