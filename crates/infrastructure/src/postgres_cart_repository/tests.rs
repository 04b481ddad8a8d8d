use rust_decimal::Decimal;
use smartsales_application::CartRepository;

use super::PostgresCartRepository;
use crate::postgres_support::test_pool::{insert_product, insert_user, test_pool};

#[tokio::test]
async fn adding_the_same_product_increments_its_line() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCartRepository::new(pool.clone());
    let user_id = insert_user(&pool, "carrito", "cliente").await;
    let product_id = insert_product(&pool, "Microondas", 75, 10).await;

    assert!(matches!(repository.find_active_cart(user_id).await, Ok(None)));
    assert!(repository.add_item(user_id, product_id, 1).await.is_ok());

    let cart = repository.add_item(user_id, product_id, 2).await;
    let Ok(cart) = cart else {
        panic!("cart should be updated");
    };
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 3);
    assert_eq!(cart.total(), Decimal::from(225));
}

#[tokio::test]
async fn clearing_reports_whether_a_cart_existed() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCartRepository::new(pool.clone());
    let user_id = insert_user(&pool, "vacio", "cliente").await;
    let product_id = insert_product(&pool, "Tostadora", 20, 3).await;

    assert!(matches!(repository.clear_active_cart(user_id).await, Ok(false)));
    assert!(repository.add_item(user_id, product_id, 1).await.is_ok());
    assert!(matches!(repository.clear_active_cart(user_id).await, Ok(true)));
    assert!(matches!(
        repository.find_active_cart(user_id).await,
        Ok(Some(ref cart)) if cart.lines.is_empty()
    ));
}
