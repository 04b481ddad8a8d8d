use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use smartsales_core::{AppError, AppResult};

const FEATURE_COUNT: usize = 4;
const RIDGE_PENALTY: f64 = 1e-6;

/// Calendar month identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month in `1..=12`.
    pub month: u32,
}

impl YearMonth {
    /// Creates a month identifier, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!("mes inválido {month}")));
        }

        Ok(Self { year, month })
    }

    /// Following calendar month.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whole months elapsed since `origin`.
    #[must_use]
    pub fn months_since(self, origin: Self) -> i64 {
        i64::from(self.year - origin.year) * 12 + i64::from(self.month) - i64::from(origin.month)
    }
}

impl Display for YearMonth {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}-{}", self.month, self.year)
    }
}

/// Observed sales total for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Observed month.
    pub period: YearMonth,
    /// Sum of sale totals in the month.
    pub total: f64,
}

/// Predicted sales total for one future month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    /// Predicted month.
    pub period: YearMonth,
    /// Predicted total rounded to cents.
    pub total: f64,
}

/// Linear trend plus yearly seasonality fitted by ridge-regularized least squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesForecastModel {
    coefficients: [f64; FEATURE_COUNT],
    first_period: YearMonth,
    last_period: YearMonth,
}

impl SalesForecastModel {
    /// Fits the model on a month-ordered history.
    pub fn fit(history: &[MonthlySales]) -> AppResult<Self> {
        let mut observations = history.to_vec();
        observations.sort_by_key(|observation| observation.period);

        let (Some(first), Some(last)) = (observations.first(), observations.last()) else {
            return Err(AppError::Validation(
                "No hay datos históricos de ventas.".to_owned(),
            ));
        };
        let first_period = first.period;
        let last_period = last.period;

        let mut gram = [[0.0_f64; FEATURE_COUNT]; FEATURE_COUNT];
        let mut moments = [0.0_f64; FEATURE_COUNT];
        for observation in &observations {
            let row = features(observation.period, first_period);
            for i in 0..FEATURE_COUNT {
                moments[i] += row[i] * observation.total;
                for j in 0..FEATURE_COUNT {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        for (index, row) in gram.iter_mut().enumerate() {
            row[index] += RIDGE_PENALTY;
        }

        let coefficients = solve(gram, moments).unwrap_or_else(|| {
            let mean =
                observations.iter().map(|item| item.total).sum::<f64>() / observations.len() as f64;
            [mean, 0.0, 0.0, 0.0]
        });

        Ok(Self {
            coefficients,
            first_period,
            last_period,
        })
    }

    /// Last observed month the model was trained on.
    #[must_use]
    pub fn trained_through(&self) -> YearMonth {
        self.last_period
    }

    /// Whether the model must be refitted for a history ending at `latest`.
    #[must_use]
    pub fn is_stale_for(&self, latest: YearMonth) -> bool {
        self.last_period != latest
    }

    /// Predicts the `months` months following the last observed month.
    #[must_use]
    pub fn predict(&self, months: u32) -> Vec<MonthlyForecast> {
        let mut period = self.last_period;
        (0..months)
            .map(|_| {
                period = period.next();
                let row = features(period, self.first_period);
                let raw: f64 = row
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(feature, coefficient)| feature * coefficient)
                    .sum();
                MonthlyForecast {
                    period,
                    total: (raw.max(0.0) * 100.0).round() / 100.0,
                }
            })
            .collect()
    }
}

fn features(period: YearMonth, origin: YearMonth) -> [f64; FEATURE_COUNT] {
    let angle = 2.0 * PI * f64::from(period.month) / 12.0;
    [
        1.0,
        period.months_since(origin) as f64,
        angle.sin(),
        angle.cos(),
    ]
}

/// Gaussian elimination with partial pivoting.
fn solve(
    mut matrix: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut vector: [f64; FEATURE_COUNT],
) -> Option<[f64; FEATURE_COUNT]> {
    for column in 0..FEATURE_COUNT {
        let pivot = (column..FEATURE_COUNT).max_by(|left, right| {
            matrix[*left][column]
                .abs()
                .total_cmp(&matrix[*right][column].abs())
        })?;
        if matrix[pivot][column].abs() < f64::EPSILON {
            return None;
        }
        matrix.swap(column, pivot);
        vector.swap(column, pivot);

        for row in (column + 1)..FEATURE_COUNT {
            let factor = matrix[row][column] / matrix[column][column];
            for k in column..FEATURE_COUNT {
                matrix[row][k] -= factor * matrix[column][k];
            }
            vector[row] -= factor * vector[column];
        }
    }

    let mut solution = [0.0_f64; FEATURE_COUNT];
    for row in (0..FEATURE_COUNT).rev() {
        let tail: f64 = ((row + 1)..FEATURE_COUNT)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (vector[row] - tail) / matrix[row][row];
    }

    solution
        .iter()
        .all(|value| value.is_finite())
        .then_some(solution)
}

#[cfg(test)]
mod tests {
    use super::{MonthlySales, SalesForecastModel, YearMonth};

    fn month(year: i32, month: u32) -> YearMonth {
        YearMonth { year, month }
    }

    fn linear_history() -> Vec<MonthlySales> {
        let mut period = month(2023, 1);
        (0..24)
            .map(|index| {
                let observation = MonthlySales {
                    period,
                    total: 1_000.0 + 50.0 * f64::from(index),
                };
                period = period.next();
                observation
            })
            .collect()
    }

    #[test]
    fn empty_history_is_rejected() {
        assert!(SalesForecastModel::fit(&[]).is_err());
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let Ok(model) = SalesForecastModel::fit(&linear_history()) else {
            panic!("model must fit");
        };

        let forecast = model.predict(2);
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].period, month(2025, 1));
        assert!((forecast[0].total - 2_200.0).abs() < 1.0);
        assert!((forecast[1].total - 2_250.0).abs() < 1.0);
    }

    #[test]
    fn staleness_tracks_last_observed_month() {
        let Ok(model) = SalesForecastModel::fit(&linear_history()) else {
            panic!("model must fit");
        };

        assert_eq!(model.trained_through(), month(2024, 12));
        assert!(!model.is_stale_for(month(2024, 12)));
        assert!(model.is_stale_for(month(2025, 1)));
    }

    #[test]
    fn single_month_history_still_produces_forecasts() {
        let history = [MonthlySales {
            period: month(2024, 6),
            total: 500.0,
        }];
        let Ok(model) = SalesForecastModel::fit(&history) else {
            panic!("model must fit");
        };

        let forecast = model.predict(3);
        assert_eq!(forecast[2].period, month(2024, 9));
        assert!(forecast.iter().all(|item| item.total.is_finite()));
    }

    #[test]
    fn month_labels_use_month_dash_year() {
        assert_eq!(month(2024, 3).to_string(), "3-2024");
        assert_eq!(month(2024, 12).next(), month(2025, 1));
    }

    proptest::proptest! {
        #[test]
        fn next_month_advances_offset_by_one(year in 2000_i32..2100, month_index in 1_u32..=12) {
            let origin = YearMonth { year: 2000, month: 1 };
            let period = YearMonth { year, month: month_index };
            proptest::prop_assert_eq!(
                period.next().months_since(origin),
                period.months_since(origin) + 1
            );
        }
    }
}
