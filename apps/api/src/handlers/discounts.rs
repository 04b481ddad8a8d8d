use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::Utc;

use smartsales_core::ActorContext;

use crate::dto::{DiscountRequest, DiscountResponse, ProductPriceQuoteResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_discounts_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DiscountResponse>>> {
    let today = Utc::now().date_naive();
    let discounts = state
        .discount_service
        .list()
        .await?
        .into_iter()
        .map(|discount| DiscountResponse::from_discount(discount, today))
        .collect();

    Ok(Json(discounts))
}

pub async fn current_discounts_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DiscountResponse>>> {
    let today = Utc::now().date_naive();
    let discounts = state
        .discount_service
        .current()
        .await?
        .into_iter()
        .map(|discount| DiscountResponse::from_discount(discount, today))
        .collect();

    Ok(Json(discounts))
}

pub async fn get_discount_handler(
    State(state): State<AppState>,
    Path(discount_id): Path<i64>,
) -> ApiResult<Json<DiscountResponse>> {
    let discount = state.discount_service.get(discount_id).await?;
    Ok(Json(DiscountResponse::from_discount(
        discount,
        Utc::now().date_naive(),
    )))
}

pub async fn product_price_quote_handler(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductPriceQuoteResponse>> {
    let quote = state.discount_service.quote_product(product_id).await?;
    Ok(Json(ProductPriceQuoteResponse::from_quote(
        quote,
        Utc::now().date_naive(),
    )))
}

pub async fn create_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<DiscountRequest>,
) -> ApiResult<(StatusCode, Json<DiscountResponse>)> {
    let discount = state
        .discount_service
        .create(&actor, payload.into_draft()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DiscountResponse::from_discount(
            discount,
            Utc::now().date_naive(),
        )),
    ))
}

pub async fn update_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(discount_id): Path<i64>,
    Json(payload): Json<DiscountRequest>,
) -> ApiResult<Json<DiscountResponse>> {
    let discount = state
        .discount_service
        .update(&actor, discount_id, payload.into_draft()?)
        .await?;

    Ok(Json(DiscountResponse::from_discount(
        discount,
        Utc::now().date_naive(),
    )))
}

pub async fn delete_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(discount_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.discount_service.delete(&actor, discount_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(discount_id): Path<i64>,
) -> ApiResult<Json<DiscountResponse>> {
    toggle(state, actor, discount_id, true).await
}

pub async fn deactivate_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(discount_id): Path<i64>,
) -> ApiResult<Json<DiscountResponse>> {
    toggle(state, actor, discount_id, false).await
}

async fn toggle(
    state: AppState,
    actor: ActorContext,
    discount_id: i64,
    active: bool,
) -> ApiResult<Json<DiscountResponse>> {
    let discount = state
        .discount_service
        .set_active(&actor, discount_id, active)
        .await?;

    Ok(Json(DiscountResponse::from_discount(
        discount,
        Utc::now().date_naive(),
    )))
}
