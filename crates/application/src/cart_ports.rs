use async_trait::async_trait;
use smartsales_core::AppResult;
use smartsales_domain::Cart;

/// Repository port for shopping carts.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Finds the user's active cart.
    async fn find_active_cart(&self, user_id: i64) -> AppResult<Option<Cart>>;

    /// Adds units of a product, creating the active cart or line when missing.
    async fn add_item(&self, user_id: i64, product_id: i64, quantity: i32) -> AppResult<Cart>;

    /// Removes every line of the active cart; `false` when there is none.
    async fn clear_active_cart(&self, user_id: i64) -> AppResult<bool>;
}
