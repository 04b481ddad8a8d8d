use chrono::NaiveDate;
use rust_decimal::Decimal;
use smartsales_application::{
    MaintenanceQuery, MaintenanceRepository, NewMaintenanceTicket, RegisterSaleInput,
    SaleRepository,
};
use smartsales_domain::{MaintenanceKind, MaintenanceStatus, SaleLineRequest};

use super::PostgresMaintenanceRepository;
use crate::PostgresSaleRepository;
use crate::postgres_support::test_pool::{insert_product, insert_user, test_pool};

#[tokio::test]
async fn open_ticket_detection_follows_status() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let customer_id = insert_user(&pool, "mant", "cliente").await;
    let technician_id = insert_user(&pool, "tecnico", "tecnico").await;
    let product_id = insert_product(&pool, "Aire acondicionado", 700, 2).await;
    let Ok(sale) = PostgresSaleRepository::new(pool.clone())
        .register_sale(RegisterSaleInput {
            customer_id,
            lines: vec![SaleLineRequest {
                product_id,
                quantity: 1,
            }],
            total: Decimal::from(700),
            registered_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
        })
        .await
    else {
        panic!("sale should be registered");
    };

    let repository = PostgresMaintenanceRepository::new(pool);
    let Ok(mut ticket) = repository
        .create_ticket(NewMaintenanceTicket {
            product_id,
            customer_id,
            sale_id: sale.id,
            kind: MaintenanceKind::Correctivo,
            description: "no enfría".to_owned(),
            covered_by_warranty: true,
        })
        .await
    else {
        panic!("ticket should be created");
    };
    assert_eq!(ticket.status, MaintenanceStatus::Pendiente);
    assert!(matches!(
        repository.has_open_ticket(product_id, sale.id).await,
        Ok(true)
    ));

    ticket.technician_id = Some(technician_id);
    ticket.transition_to(MaintenanceStatus::Completado, chrono::Utc::now());
    let saved = repository.save_ticket(&ticket).await;
    assert!(matches!(saved, Ok(ref saved) if saved.performed_at.is_some()));
    assert!(matches!(
        repository.has_open_ticket(product_id, sale.id).await,
        Ok(false)
    ));

    let assigned = repository
        .list_tickets(MaintenanceQuery {
            technician_id: Some(technician_id),
            ..MaintenanceQuery::default()
        })
        .await;
    assert!(matches!(assigned, Ok(ref list) if list.len() == 1));
}
