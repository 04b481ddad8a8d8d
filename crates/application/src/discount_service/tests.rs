use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use smartsales_core::{AppError, AppResult, UserRole};
use smartsales_domain::{Discount, DiscountDraft};
use tokio::sync::Mutex;

use super::DiscountService;
use crate::DiscountRepository;
use crate::test_support::{FakeCatalogRepository, actor, product, recorder};

#[derive(Default)]
struct FakeDiscountRepository {
    discounts: Mutex<Vec<Discount>>,
}

fn from_draft(id: i64, draft: DiscountDraft) -> Discount {
    Discount {
        id,
        product_id: draft.product_id,
        product_name: draft.product_id.map(|_| "Lavadora".to_owned()),
        percentage: draft.percentage,
        starts_on: draft.starts_on,
        ends_on: draft.ends_on,
        description: draft.description,
        active: draft.active,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl DiscountRepository for FakeDiscountRepository {
    async fn list_discounts(&self) -> AppResult<Vec<Discount>> {
        Ok(self.discounts.lock().await.clone())
    }

    async fn find_discount(&self, discount_id: i64) -> AppResult<Option<Discount>> {
        Ok(self
            .discounts
            .lock()
            .await
            .iter()
            .find(|discount| discount.id == discount_id)
            .cloned())
    }

    async fn create_discount(&self, draft: DiscountDraft) -> AppResult<Discount> {
        let mut discounts = self.discounts.lock().await;
        let discount = from_draft(i64::try_from(discounts.len()).unwrap_or_default() + 1, draft);
        discounts.push(discount.clone());
        Ok(discount)
    }

    async fn update_discount(&self, discount_id: i64, draft: DiscountDraft) -> AppResult<Discount> {
        let mut discounts = self.discounts.lock().await;
        let existing = discounts
            .iter_mut()
            .find(|discount| discount.id == discount_id)
            .ok_or_else(|| AppError::NotFound(format!("descuento {discount_id}")))?;
        *existing = from_draft(discount_id, draft);
        Ok(existing.clone())
    }

    async fn delete_discount(&self, discount_id: i64) -> AppResult<()> {
        self.discounts
            .lock()
            .await
            .retain(|discount| discount.id != discount_id);
        Ok(())
    }

    async fn set_active(&self, discount_id: i64, active: bool) -> AppResult<Discount> {
        let mut discounts = self.discounts.lock().await;
        let existing = discounts
            .iter_mut()
            .find(|discount| discount.id == discount_id)
            .ok_or_else(|| AppError::NotFound(format!("descuento {discount_id}")))?;
        existing.active = active;
        Ok(existing.clone())
    }

    async fn list_current(&self, today: NaiveDate) -> AppResult<Vec<Discount>> {
        Ok(self
            .discounts
            .lock()
            .await
            .iter()
            .filter(|discount| discount.is_current(today))
            .cloned()
            .collect())
    }

    async fn list_for_product(&self, product_id: i64) -> AppResult<Vec<Discount>> {
        Ok(self
            .discounts
            .lock()
            .await
            .iter()
            .filter(|discount| discount.product_id == Some(product_id))
            .cloned()
            .collect())
    }
}

fn draft(product_id: Option<i64>, percentage: i64) -> DiscountDraft {
    let today = Utc::now().date_naive();
    let Some(ends_on) = today.succ_opt() else {
        panic!("tomorrow should exist");
    };
    let Ok(draft) = DiscountDraft::new(
        product_id,
        Decimal::from(percentage),
        today,
        ends_on,
        "Campaña",
        true,
    ) else {
        panic!("draft should be valid");
    };
    draft
}

fn service() -> (
    DiscountService,
    Arc<FakeCatalogRepository>,
    Arc<crate::test_support::RecordingAuditRepository>,
) {
    let catalog = Arc::new(FakeCatalogRepository::with_products(vec![product(
        1, "Lavadora", 400, 5,
    )]));
    let (audit, entries) = recorder();
    (
        DiscountService::new(
            Arc::new(FakeDiscountRepository::default()),
            catalog.clone(),
            audit,
        ),
        catalog,
        entries,
    )
}

#[tokio::test]
async fn creating_active_discount_mirrors_onto_product() {
    let (service, catalog, entries) = service();

    let result = service
        .create(&actor(1, UserRole::Administrador), draft(Some(1), 25))
        .await;

    assert!(result.is_ok());
    let Some(product) = catalog.product(1).await else {
        panic!("product should exist");
    };
    assert_eq!(
        product.discount.map(|discount| discount.percentage),
        Some(Decimal::from(25))
    );
    assert_eq!(
        entries.actions().await,
        vec!["Creó descuento de 25% para producto Lavadora".to_owned()]
    );
}

#[tokio::test]
async fn deleting_discount_restores_product_price() {
    let (service, catalog, _) = service();
    let admin = actor(1, UserRole::Administrador);
    let Ok(discount) = service.create(&admin, draft(Some(1), 25)).await else {
        panic!("discount should be created");
    };

    assert!(service.delete(&admin, discount.id).await.is_ok());
    let Some(product) = catalog.product(1).await else {
        panic!("product should exist");
    };
    assert!(product.discount.is_none());
}

#[tokio::test]
async fn quote_uses_highest_current_discount() {
    let (service, _, _) = service();
    let admin = actor(1, UserRole::Administrador);
    assert!(service.create(&admin, draft(Some(1), 10)).await.is_ok());
    assert!(service.create(&admin, draft(Some(1), 30)).await.is_ok());

    let Ok(quote) = service.quote_product(1).await else {
        panic!("quote should be computed");
    };

    assert_eq!(quote.original_price, Decimal::from(400));
    assert_eq!(quote.discounted_price, Decimal::from(280));
    assert_eq!(quote.savings, Decimal::from(120));
}

#[tokio::test]
async fn deactivation_clears_mirrored_discount() {
    let (service, catalog, entries) = service();
    let admin = actor(1, UserRole::Administrador);
    let Ok(discount) = service.create(&admin, draft(Some(1), 15)).await else {
        panic!("discount should be created");
    };

    let result = service.set_active(&admin, discount.id, false).await;

    assert!(matches!(result, Ok(ref discount) if !discount.active));
    assert!(matches!(catalog.product(1).await, Some(ref product) if product.discount.is_none()));
    assert_eq!(entries.actions().await[1], format!("Desactivó descuento #{}", discount.id));
}

#[tokio::test]
async fn discount_writes_require_admin_and_existing_product() {
    let (service, _, _) = service();

    let denied = service
        .create(&actor(4, UserRole::Tecnico), draft(Some(1), 10))
        .await;
    let missing = service
        .create(&actor(1, UserRole::Administrador), draft(Some(42), 10))
        .await;

    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
