use super::*;

pub async fn create_payment_intent_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<PaymentIntentRequest>,
) -> ApiResult<Json<PaymentIntentResponse>> {
    let amount = payload
        .monto
        .ok_or_else(|| AppError::Validation("el monto es obligatorio".to_owned()))?;
    let intent = state
        .sale_service
        .create_payment_intent(&actor, amount)
        .await?;

    Ok(Json(PaymentIntentResponse::from(intent)))
}

pub async fn register_sale_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<RegisterSaleRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredSaleResponse>)> {
    let lines = payload.productos.into_iter().map(Into::into).collect();
    let sale = state
        .sale_service
        .register_sale(&actor, lines, payload.total)
        .await?;
    let note = sale_note_key(sale.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredSaleResponse {
            mensaje: "Venta registrada con éxito.".to_owned(),
            venta: SaleResponse::from(sale),
            nota_venta: note,
        }),
    ))
}
