use std::sync::Arc;

use rust_decimal::Decimal;
use smartsales_core::{AppError, UserRole};
use smartsales_domain::{ProductDiscount, ProductDraft};

use super::CatalogService;
use crate::ProductQuery;
use crate::test_support::{FakeCatalogRepository, actor, date, product, recorder};

fn draft(name: &str, brand_id: Option<i64>) -> ProductDraft {
    let Ok(draft) = ProductDraft::new(
        name,
        "Equipo de línea blanca",
        Decimal::new(45_000, 2),
        8,
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
async fn brand_writes_require_admin_and_are_audited() {
    let (audit, entries) = recorder();
    let service = CatalogService::new(Arc::new(FakeCatalogRepository::default()), audit);

    let denied = service
        .create_brand(&actor(3, UserRole::Cliente), "Samsung")
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let admin = actor(1, UserRole::Administrador);
    let Ok(brand) = service.create_brand(&admin, "  Samsung ").await else {
        panic!("admin should create brand");
    };
    assert_eq!(brand.name, "Samsung");
    assert!(service.update_brand(&admin, brand.id, "Samsung Electronics").await.is_ok());
    assert!(service.delete_brand(&admin, brand.id).await.is_ok());

    assert_eq!(
        entries.actions().await,
        vec![
            "Creó marca: Samsung".to_owned(),
            "Actualizó marca: Samsung Electronics".to_owned(),
            "Eliminó marca: Samsung Electronics".to_owned(),
        ]
    );
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let (audit, _) = recorder();
    let service = CatalogService::new(Arc::new(FakeCatalogRepository::default()), audit);

    let result = service
        .create_category(&actor(1, UserRole::Administrador), "   ")
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn product_with_unknown_brand_is_not_found() {
    let (audit, entries) = recorder();
    let service = CatalogService::new(Arc::new(FakeCatalogRepository::default()), audit);

    let result = service
        .create_product(&actor(1, UserRole::Administrador), draft("Lavadora", Some(99)))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(entries.actions().await.is_empty());
}

#[tokio::test]
async fn product_search_ignores_blank_terms() {
    let (audit, _) = recorder();
    let repository = FakeCatalogRepository::with_products(vec![
        product(1, "Lavadora", 400, 3),
        product(2, "Cocina", 150, 2),
    ]);
    let service = CatalogService::new(Arc::new(repository), audit);

    let all = service
        .list_products(ProductQuery {
            search: Some("  ".to_owned()),
            ..ProductQuery::default()
        })
        .await;
    let filtered = service
        .list_products(ProductQuery {
            search: Some("lava".to_owned()),
            ..ProductQuery::default()
        })
        .await;

    assert!(matches!(all, Ok(ref products) if products.len() == 2));
    assert!(matches!(filtered, Ok(ref products) if products.len() == 1));
}

#[tokio::test]
async fn product_discount_is_validated_and_audited() {
    let (audit, entries) = recorder();
    let repository = Arc::new(FakeCatalogRepository::with_products(vec![product(
        1, "Lavadora", 400, 3,
    )]));
    let service = CatalogService::new(repository.clone(), audit);
    let admin = actor(1, UserRole::Administrador);

    let invalid = service
        .set_product_discount(
            &admin,
            1,
            Some(ProductDiscount {
                percentage: Decimal::from(120),
                starts_on: date(2024, 9, 1),
                ends_on: date(2024, 9, 30),
            }),
        )
        .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));

    let applied = service
        .set_product_discount(
            &admin,
            1,
            Some(ProductDiscount {
                percentage: Decimal::from(15),
                starts_on: date(2024, 9, 1),
                ends_on: date(2024, 9, 30),
            }),
        )
        .await;
    let Ok(applied) = applied else {
        panic!("discount should apply");
    };
    assert_eq!(
        applied.effective_price(date(2024, 9, 10)),
        Decimal::from(340)
    );
    assert_eq!(
        entries.actions().await,
        vec!["Aplicó descuento de 15% a producto: Lavadora".to_owned()]
    );
}
