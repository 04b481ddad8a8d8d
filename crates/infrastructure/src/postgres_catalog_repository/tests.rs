use chrono::NaiveDate;
use rust_decimal::Decimal;
use smartsales_application::{CatalogRepository, ProductOrdering, ProductQuery};
use smartsales_core::AppError;
use smartsales_domain::{ProductDiscount, ProductDraft};

use super::PostgresCatalogRepository;
use crate::postgres_support::test_pool::test_pool;

fn draft(name: &str, price: i64, brand_id: Option<i64>) -> ProductDraft {
    let Ok(draft) = ProductDraft::new(
        name,
        "equipo de línea blanca",
        Decimal::from(price),
        5,
        12,
        brand_id,
        None,
        None,
        true,
    ) else {
        panic!("draft should be valid");
    };
    draft
}

#[tokio::test]
async fn products_join_brand_and_filter_by_search() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCatalogRepository::new(pool);
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    let Ok(brand) = repository.create_brand(&format!("Marca {suffix}")).await else {
        panic!("brand should be created");
    };
    let duplicate = repository.create_brand(&format!("Marca {suffix}")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let Ok(cheap) = repository
        .create_product(draft(&format!("Licuadora {suffix}"), 40, Some(brand.id)))
        .await
    else {
        panic!("product should be created");
    };
    let Ok(expensive) = repository
        .create_product(draft(&format!("Refrigerador {suffix}"), 900, Some(brand.id)))
        .await
    else {
        panic!("product should be created");
    };
    assert_eq!(cheap.brand_name(), brand.name);

    let listed = repository
        .list_products(ProductQuery {
            search: Some(suffix.clone()),
            ordering: ProductOrdering::PriceDescending,
            ..ProductQuery::default()
        })
        .await;
    let Ok(listed) = listed else {
        panic!("products should list");
    };
    let ids = listed.iter().map(|product| product.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![expensive.id, cheap.id]);
}

#[tokio::test]
async fn product_discount_is_set_and_cleared() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCatalogRepository::new(pool);
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    let Ok(product) = repository
        .create_product(draft(&format!("Horno {suffix}"), 200, None))
        .await
    else {
        panic!("product should be created");
    };

    let discount = ProductDiscount {
        percentage: Decimal::from(10),
        starts_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
        ends_on: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap_or_default(),
    };
    let updated = repository
        .set_product_discount(product.id, Some(discount))
        .await;
    assert!(matches!(updated, Ok(ref product) if product.discount == Some(discount)));

    let cleared = repository.set_product_discount(product.id, None).await;
    assert!(matches!(cleared, Ok(ref product) if product.discount.is_none()));

    assert!(repository.delete_product(product.id).await.is_ok());
    assert!(matches!(
        repository.set_product_discount(product.id, None).await,
        Err(AppError::NotFound(_))
    ));
}
