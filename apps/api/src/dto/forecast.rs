use serde::Serialize;
use smartsales_application::ForecastOverview;
use smartsales_domain::{MonthlyForecast, MonthlySales};
use ts_rs::TS;

/// Observed monthly total as exposed by the history endpoint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/monthly-sales-response.ts"
)]
pub struct MonthlySalesResponse {
    pub mes: String,
    pub total_ventas: f64,
}

/// One month with its total, observed or predicted.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/forecast-point-response.ts"
)]
pub struct ForecastPointResponse {
    pub mes: String,
    pub ventas: f64,
}

/// History and predictions side by side.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/forecast-overview-response.ts"
)]
pub struct ForecastOverviewResponse {
    pub historico: Vec<ForecastPointResponse>,
    pub predicciones: Vec<ForecastPointResponse>,
}

impl From<MonthlySales> for MonthlySalesResponse {
    fn from(value: MonthlySales) -> Self {
        Self {
            mes: value.period.to_string(),
            total_ventas: value.total,
        }
    }
}

impl From<MonthlySales> for ForecastPointResponse {
    fn from(value: MonthlySales) -> Self {
        Self {
            mes: value.period.to_string(),
            ventas: value.total,
        }
    }
}

impl From<MonthlyForecast> for ForecastPointResponse {
    fn from(value: MonthlyForecast) -> Self {
        Self {
            mes: value.period.to_string(),
            ventas: value.total,
        }
    }
}

impl From<ForecastOverview> for ForecastOverviewResponse {
    fn from(overview: ForecastOverview) -> Self {
        Self {
            historico: overview.historic.into_iter().map(Into::into).collect(),
            predicciones: overview.predictions.into_iter().map(Into::into).collect(),
        }
    }
}
