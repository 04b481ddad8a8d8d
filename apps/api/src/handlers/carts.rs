use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;

use smartsales_core::ActorContext;

use crate::dto::{AddToCartRequest, CartResponse, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the active cart, or `null` when the user has none.
pub async fn active_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Option<CartResponse>>> {
    let cart = state.cart_service.active_cart(&actor).await?;
    Ok(Json(cart.map(CartResponse::from)))
}

pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartResponse>)> {
    let cart = state
        .cart_service
        .add_product(&actor, payload.producto_id, payload.cantidad.unwrap_or(1))
        .await?;

    Ok((StatusCode::CREATED, Json(CartResponse::from(cart))))
}

pub async fn clear_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<MessageResponse>> {
    state.cart_service.clear(&actor).await?;
    Ok(Json(MessageResponse::new("Carrito vaciado correctamente.")))
}
