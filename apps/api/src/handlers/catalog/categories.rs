use super::*;

pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state
        .catalog_service
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(categories))
}

pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state.catalog_service.get_category(category_id).await?;
    Ok(Json(CategoryResponse::from(category)))
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<NamedResourceRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state
        .catalog_service
        .create_category(&actor, &payload.nombre)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(category_id): Path<i64>,
    Json(payload): Json<NamedResourceRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state
        .catalog_service
        .update_category(&actor, category_id, &payload.nombre)
        .await?;

    Ok(Json(CategoryResponse::from(category)))
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(category_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog_service.delete_category(&actor, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
