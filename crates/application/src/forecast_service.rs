use std::sync::Arc;

use smartsales_core::{AppError, AppResult};
use smartsales_domain::{MonthlyForecast, MonthlySales, SalesForecastModel};
use tracing::{info, warn};

use crate::{ForecastModelCache, SaleRepository};

/// Horizon used when the caller gives none or an invalid one.
pub const DEFAULT_FORECAST_MONTHS: u32 = 6;

/// Monthly history alongside the forecast that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOverview {
    /// Observed monthly totals.
    pub historic: Vec<MonthlySales>,
    /// Predicted monthly totals.
    pub predictions: Vec<MonthlyForecast>,
}

/// Application service for monthly sales history and forecasting.
#[derive(Clone)]
pub struct ForecastService {
    sales: Arc<dyn SaleRepository>,
    cache: Arc<dyn ForecastModelCache>,
}

impl ForecastService {
    /// Creates a new forecast service.
    #[must_use]
    pub fn new(sales: Arc<dyn SaleRepository>, cache: Arc<dyn ForecastModelCache>) -> Self {
        Self { sales, cache }
    }

    /// Monthly totals of non-cancelled sales, oldest first.
    pub async fn historic(&self) -> AppResult<Vec<MonthlySales>> {
        let mut history = self.sales.monthly_totals().await?;
        history.sort_by_key(|month| month.period);
        Ok(history)
    }

    /// Predicts the months after the last observed one.
    pub async fn predict(&self, months: Option<i64>) -> AppResult<Vec<MonthlyForecast>> {
        let history = self.historic().await?;
        let model = self.model_for(&history).await?;
        Ok(model.predict(horizon(months)))
    }

    /// History and predictions in one call.
    pub async fn overview(&self, months: Option<i64>) -> AppResult<ForecastOverview> {
        let historic = self.historic().await?;
        let model = self.model_for(&historic).await?;
        let predictions = model.predict(horizon(months));

        Ok(ForecastOverview {
            historic,
            predictions,
        })
    }

    async fn model_for(&self, history: &[MonthlySales]) -> AppResult<SalesForecastModel> {
        let latest = history
            .last()
            .map(|month| month.period)
            .ok_or_else(|| AppError::Validation("No hay datos históricos de ventas.".to_owned()))?;

        match self.cache.load().await {
            Ok(Some(model)) if !model.is_stale_for(latest) => return Ok(model),
            Ok(_) => {}
            Err(error) => warn!(error = %error, "failed to load cached forecast model"),
        }

        let model = SalesForecastModel::fit(history)?;
        info!(trained_through = %latest, months = history.len(), "forecast model retrained");
        if let Err(error) = self.cache.store(model.clone()).await {
            warn!(error = %error, "failed to cache forecast model");
        }
        Ok(model)
    }
}

fn horizon(months: Option<i64>) -> u32 {
    months
        .filter(|months| *months >= 1)
        .and_then(|months| u32::try_from(months).ok())
        .unwrap_or(DEFAULT_FORECAST_MONTHS)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use smartsales_core::{AppError, AppResult};
    use smartsales_domain::{
        MonthlySales, Sale, SaleStatus, SalesForecastModel, Warranty, YearMonth,
    };
    use tokio::sync::Mutex;

    use super::{DEFAULT_FORECAST_MONTHS, ForecastService, horizon};
    use crate::{ForecastModelCache, RegisterSaleInput, SaleQuery, SaleRepository};

    struct History(Mutex<Vec<MonthlySales>>);

    #[async_trait]
    impl SaleRepository for History {
        async fn register_sale(&self, _input: RegisterSaleInput) -> AppResult<Sale> {
            Err(AppError::Internal("not used".to_owned()))
        }

        async fn cancel_sale(&self, _sale_id: i64) -> AppResult<Sale> {
            Err(AppError::Internal("not used".to_owned()))
        }

        async fn find_sale(&self, _sale_id: i64) -> AppResult<Option<Sale>> {
            Ok(None)
        }

        async fn list_sales(&self, _query: SaleQuery) -> AppResult<Vec<Sale>> {
            Ok(Vec::new())
        }

        async fn update_status(&self, _sale_id: i64, _status: SaleStatus) -> AppResult<Sale> {
            Err(AppError::Internal("not used".to_owned()))
        }

        async fn list_warranties(&self, _sale_id: i64) -> AppResult<Vec<Warranty>> {
            Ok(Vec::new())
        }

        async fn monthly_totals(&self) -> AppResult<Vec<MonthlySales>> {
            Ok(self.0.lock().await.clone())
        }
    }

    #[derive(Default)]
    struct CountingCache {
        model: Mutex<Option<SalesForecastModel>>,
        stores: AtomicUsize,
    }

    #[async_trait]
    impl ForecastModelCache for CountingCache {
        async fn load(&self) -> AppResult<Option<SalesForecastModel>> {
            Ok(self.model.lock().await.clone())
        }

        async fn store(&self, model: SalesForecastModel) -> AppResult<()> {
            self.stores.fetch_add(1, Ordering::SeqCst);
            *self.model.lock().await = Some(model);
            Ok(())
        }
    }

    fn month(year: i32, month: u32, total: f64) -> MonthlySales {
        let Ok(period) = YearMonth::new(year, month) else {
            panic!("valid month expected");
        };
        MonthlySales { period, total }
    }

    fn history() -> Vec<MonthlySales> {
        (1..=12)
            .map(|index| month(2024, index, 1_000.0 + f64::from(index) * 100.0))
            .collect()
    }

    #[tokio::test]
    async fn empty_history_is_a_validation_error() {
        let service = ForecastService::new(
            Arc::new(History(Mutex::new(Vec::new()))),
            Arc::new(CountingCache::default()),
        );

        let result = service.predict(None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn predictions_follow_last_observed_month() {
        let service = ForecastService::new(
            Arc::new(History(Mutex::new(history()))),
            Arc::new(CountingCache::default()),
        );

        let Ok(predictions) = service.predict(Some(3)).await else {
            panic!("predictions expected");
        };

        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].period.to_string(), "1-2025");
        assert_eq!(predictions[2].period.to_string(), "3-2025");
        assert!(predictions.iter().all(|prediction| prediction.total >= 0.0));
    }

    #[tokio::test]
    async fn cached_model_is_reused_until_a_new_month_appears() {
        let sales = Arc::new(History(Mutex::new(history())));
        let cache = Arc::new(CountingCache::default());
        let service = ForecastService::new(sales.clone(), cache.clone());

        assert!(service.predict(None).await.is_ok());
        assert!(service.overview(None).await.is_ok());
        assert_eq!(cache.stores.load(Ordering::SeqCst), 1);

        sales.0.lock().await.push(month(2025, 1, 2_500.0));
        let Ok(overview) = service.overview(Some(2)).await else {
            panic!("overview expected");
        };
        assert_eq!(cache.stores.load(Ordering::SeqCst), 2);
        assert_eq!(overview.historic.len(), 13);
        assert_eq!(overview.predictions[0].period.to_string(), "2-2025");
    }

    #[test]
    fn invalid_horizons_fall_back_to_default() {
        assert_eq!(horizon(None), DEFAULT_FORECAST_MONTHS);
        assert_eq!(horizon(Some(0)), DEFAULT_FORECAST_MONTHS);
        assert_eq!(horizon(Some(-4)), DEFAULT_FORECAST_MONTHS);
        assert_eq!(horizon(Some(12)), 12);
    }
}
