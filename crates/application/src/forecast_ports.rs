use async_trait::async_trait;
use smartsales_core::AppResult;
use smartsales_domain::SalesForecastModel;

/// Port holding the last fitted forecast model.
#[async_trait]
pub trait ForecastModelCache: Send + Sync {
    /// Returns the cached model, if any.
    async fn load(&self) -> AppResult<Option<SalesForecastModel>>;

    /// Replaces the cached model.
    async fn store(&self, model: SalesForecastModel) -> AppResult<()>;
}
