use axum::Json;
use axum::extract::{Query, State};

use crate::dto::{ForecastOverviewResponse, ForecastPointResponse, MonthlySalesResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ForecastQuery {
    pub meses: Option<String>,
}

impl ForecastQuery {
    /// Unparseable horizons fall back to the service default.
    fn months(&self) -> Option<i64> {
        self.meses
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
    }
}

pub async fn historic_sales_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MonthlySalesResponse>>> {
    let history = state
        .forecast_service
        .historic()
        .await?
        .into_iter()
        .map(MonthlySalesResponse::from)
        .collect();

    Ok(Json(history))
}

pub async fn predict_sales_handler(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> ApiResult<Json<Vec<ForecastPointResponse>>> {
    let predictions = state
        .forecast_service
        .predict(query.months())
        .await?
        .into_iter()
        .map(ForecastPointResponse::from)
        .collect();

    Ok(Json(predictions))
}

pub async fn forecast_overview_handler(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> ApiResult<Json<ForecastOverviewResponse>> {
    let overview = state.forecast_service.overview(query.months()).await?;
    Ok(Json(ForecastOverviewResponse::from(overview)))
}

#[cfg(test)]
mod tests {
    use super::ForecastQuery;

    #[test]
    fn unparseable_horizon_is_treated_as_absent() {
        let query = ForecastQuery {
            meses: Some("doce".to_owned()),
        };
        assert_eq!(query.months(), None);

        let query = ForecastQuery {
            meses: Some(" 3 ".to_owned()),
        };
        assert_eq!(query.months(), Some(3));
    }
}
