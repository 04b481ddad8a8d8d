use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Plain confirmation payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/message-response.ts"
)]
pub struct MessageResponse {
    pub mensaje: String,
}

impl MessageResponse {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
        }
    }
}

/// Money rendered with two decimals.
pub(super) fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

pub(super) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(super) fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::money;

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(Decimal::new(15, 0)), "15.00");
        assert_eq!(money(Decimal::new(12346, 3)), "12.35");
    }
}
