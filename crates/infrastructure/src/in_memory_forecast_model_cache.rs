use async_trait::async_trait;
use smartsales_application::ForecastModelCache;
use smartsales_core::AppResult;
use smartsales_domain::SalesForecastModel;
use tokio::sync::RwLock;

/// Process-local cache for the last fitted forecast model.
#[derive(Default)]
pub struct InMemoryForecastModelCache {
    model: RwLock<Option<SalesForecastModel>>,
}

impl InMemoryForecastModelCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForecastModelCache for InMemoryForecastModelCache {
    async fn load(&self) -> AppResult<Option<SalesForecastModel>> {
        Ok(self.model.read().await.clone())
    }

    async fn store(&self, model: SalesForecastModel) -> AppResult<()> {
        *self.model.write().await = Some(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use smartsales_application::ForecastModelCache;
    use smartsales_domain::{MonthlySales, SalesForecastModel, YearMonth};

    use super::InMemoryForecastModelCache;

    fn model(last_month: u32) -> SalesForecastModel {
        let history = (1..=last_month)
            .filter_map(|month| YearMonth::new(2024, month).ok())
            .map(|period| MonthlySales {
                period,
                total: 1_000.0 + f64::from(period.month) * 10.0,
            })
            .collect::<Vec<_>>();
        let Ok(model) = SalesForecastModel::fit(&history) else {
            panic!("model should fit");
        };
        model
    }

    #[tokio::test]
    async fn stored_model_replaces_previous_one() {
        let cache = InMemoryForecastModelCache::new();
        assert!(matches!(cache.load().await, Ok(None)));

        assert!(cache.store(model(4)).await.is_ok());
        assert!(cache.store(model(6)).await.is_ok());

        let loaded = cache.load().await;
        assert!(matches!(
            loaded,
            Ok(Some(ref model)) if model.trained_through() == YearMonth { year: 2024, month: 6 }
        ));
    }
}
