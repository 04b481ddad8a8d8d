use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

use smartsales_application::{SaleHistoryFilter, StatsPeriod, sale_note_key};
use smartsales_core::{ActorContext, AppError};
use smartsales_domain::SaleStatus;

use crate::dto::{
    PaymentIntentRequest, PaymentIntentResponse, PurchaseSummaryResponse, RegisterSaleRequest,
    RegisteredSaleResponse, SaleResponse, SalesStatisticsResponse, UpdateSaleStatusRequest,
    WarrantyResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_optional;

mod history;
mod payments;

pub use history::{
    cancel_sale_handler, my_purchases_handler, sale_history_handler, sales_by_period_handler,
    sales_statistics_handler,
};
pub use payments::{create_payment_intent_handler, register_sale_handler};

pub async fn list_sales_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<SaleResponse>>> {
    let sales = state
        .sale_service
        .list_sales(&actor)
        .await?
        .into_iter()
        .map(SaleResponse::from)
        .collect();

    Ok(Json(sales))
}

pub async fn get_sale_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Json<SaleResponse>> {
    let sale = state.sale_service.get_sale(&actor, sale_id).await?;
    Ok(Json(SaleResponse::from(sale)))
}

pub async fn update_sale_status_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sale_id): Path<i64>,
    Json(payload): Json<UpdateSaleStatusRequest>,
) -> ApiResult<Json<SaleResponse>> {
    let status: SaleStatus = payload.estado.parse()?;
    let sale = state
        .sale_service
        .update_status(&actor, sale_id, status)
        .await?;

    Ok(Json(SaleResponse::from(sale)))
}

pub async fn sale_warranties_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Json<Vec<WarrantyResponse>>> {
    let warranties = state
        .sale_service
        .warranties(&actor, sale_id)
        .await?
        .into_iter()
        .map(WarrantyResponse::from)
        .collect();

    Ok(Json(warranties))
}
