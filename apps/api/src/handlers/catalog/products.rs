use super::*;

#[derive(Debug, serde::Deserialize)]
pub struct ProductListQuery {
    pub marca: Option<i64>,
    pub categoria: Option<i64>,
    pub estado: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let ordering = parse_optional::<ProductOrdering>(query.ordering)?.unwrap_or_default();
    let today = Utc::now().date_naive();
    let products = state
        .catalog_service
        .list_products(ProductQuery {
            brand_id: query.marca,
            category_id: query.categoria,
            active: query.estado,
            search: query.search,
            ordering,
        })
        .await?
        .into_iter()
        .map(|product| ProductResponse::from_product(product, today))
        .collect();

    Ok(Json(products))
}

pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state.catalog_service.get_product(product_id).await?;
    Ok(Json(ProductResponse::from_product(
        product,
        Utc::now().date_naive(),
    )))
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .catalog_service
        .create_product(&actor, payload.into_draft()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::from_product(
            product,
            Utc::now().date_naive(),
        )),
    ))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .update_product(&actor, product_id, payload.into_draft()?)
        .await?;

    Ok(Json(ProductResponse::from_product(
        product,
        Utc::now().date_naive(),
    )))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_product(&actor, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_product_discount_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductDiscountRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .set_product_discount(&actor, product_id, payload.into_discount()?)
        .await?;

    Ok(Json(ProductResponse::from_product(
        product,
        Utc::now().date_naive(),
    )))
}
