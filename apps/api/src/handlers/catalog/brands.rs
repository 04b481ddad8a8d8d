use super::*;

pub async fn list_brands_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BrandResponse>>> {
    let brands = state
        .catalog_service
        .list_brands()
        .await?
        .into_iter()
        .map(BrandResponse::from)
        .collect();

    Ok(Json(brands))
}

pub async fn get_brand_handler(
    State(state): State<AppState>,
    Path(brand_id): Path<i64>,
) -> ApiResult<Json<BrandResponse>> {
    let brand = state.catalog_service.get_brand(brand_id).await?;
    Ok(Json(BrandResponse::from(brand)))
}

pub async fn create_brand_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<NamedResourceRequest>,
) -> ApiResult<(StatusCode, Json<BrandResponse>)> {
    let brand = state
        .catalog_service
        .create_brand(&actor, &payload.nombre)
        .await?;

    Ok((StatusCode::CREATED, Json(BrandResponse::from(brand))))
}

pub async fn update_brand_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(brand_id): Path<i64>,
    Json(payload): Json<NamedResourceRequest>,
) -> ApiResult<Json<BrandResponse>> {
    let brand = state
        .catalog_service
        .update_brand(&actor, brand_id, &payload.nombre)
        .await?;

    Ok(Json(BrandResponse::from(brand)))
}

pub async fn delete_brand_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(brand_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog_service.delete_brand(&actor, brand_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
