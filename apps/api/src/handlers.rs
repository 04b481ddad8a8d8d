use std::str::FromStr;

use smartsales_core::{AppError, AppResult};

pub mod audit;
pub mod carts;
pub mod catalog;
pub mod discounts;
pub mod forecast;
pub mod health;
pub mod maintenance;
pub mod reports;
pub mod sales;
pub mod users;

/// Parses an optional query value, treating blank input as absent.
fn parse_optional<T>(value: Option<String>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::parse)
        .transpose()
}

#[cfg(test)]
mod tests {
    use smartsales_domain::SaleStatus;

    use super::parse_optional;

    #[test]
    fn blank_query_values_are_ignored() {
        assert!(matches!(
            parse_optional::<SaleStatus>(Some("  ".to_owned())),
            Ok(None)
        ));
        assert!(matches!(
            parse_optional::<SaleStatus>(Some("pagado".to_owned())),
            Ok(Some(SaleStatus::Pagado))
        ));
        assert!(parse_optional::<SaleStatus>(Some("perdido".to_owned())).is_err());
    }
}
