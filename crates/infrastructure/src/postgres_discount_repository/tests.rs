use chrono::NaiveDate;
use rust_decimal::Decimal;
use smartsales_application::DiscountRepository;
use smartsales_core::AppError;
use smartsales_domain::DiscountDraft;

use super::PostgresDiscountRepository;
use crate::postgres_support::test_pool::{insert_product, test_pool};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[tokio::test]
async fn current_listing_honours_window_and_switch() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresDiscountRepository::new(pool.clone());
    let product_id = insert_product(&pool, "Ventilador", 60, 8).await;

    let Ok(draft) = DiscountDraft::new(
        Some(product_id),
        Decimal::from(15),
        date(2031, 1, 1),
        date(2031, 1, 31),
        "rebajas de enero",
        true,
    ) else {
        panic!("draft should be valid");
    };
    let Ok(discount) = repository.create_discount(draft).await else {
        panic!("discount should be created");
    };
    assert_eq!(discount.product_name.as_deref(), Some("Ventilador"));

    let inside = repository.list_current(date(2031, 1, 15)).await;
    assert!(matches!(inside, Ok(ref list) if list.iter().any(|item| item.id == discount.id)));

    let outside = repository.list_current(date(2031, 2, 1)).await;
    assert!(matches!(outside, Ok(ref list) if list.iter().all(|item| item.id != discount.id)));

    assert!(repository.set_active(discount.id, false).await.is_ok());
    let disabled = repository.list_current(date(2031, 1, 15)).await;
    assert!(matches!(disabled, Ok(ref list) if list.iter().all(|item| item.id != discount.id)));

    assert!(repository.delete_discount(discount.id).await.is_ok());
    assert!(matches!(
        repository.set_active(discount.id, true).await,
        Err(AppError::NotFound(_))
    ));
}
