use super::*;

#[derive(Debug, serde::Deserialize)]
pub struct SaleHistoryQuery {
    pub estado: Option<String>,
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
    pub usuario_id: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
pub struct MyPurchasesQuery {
    pub estado: Option<String>,
    pub limite: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
pub struct StatisticsQuery {
    pub periodo: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct PeriodQuery {
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
}

pub async fn sale_history_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<SaleHistoryQuery>,
) -> ApiResult<Json<Vec<SaleResponse>>> {
    let filter = SaleHistoryFilter {
        status: parse_optional(query.estado)?,
        from: query.fecha_desde,
        to: query.fecha_hasta,
        customer_id: query.usuario_id,
    };
    let sales = state
        .sale_service
        .history(&actor, filter)
        .await?
        .into_iter()
        .map(SaleResponse::from)
        .collect();

    Ok(Json(sales))
}

pub async fn my_purchases_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<MyPurchasesQuery>,
) -> ApiResult<Json<PurchaseSummaryResponse>> {
    let status = parse_optional::<SaleStatus>(query.estado)?;
    let summary = state
        .sale_service
        .my_purchases(&actor, status, query.limite)
        .await?;

    Ok(Json(PurchaseSummaryResponse::from(summary)))
}

pub async fn sales_statistics_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<StatisticsQuery>,
) -> ApiResult<Json<SalesStatisticsResponse>> {
    let period = parse_optional::<StatsPeriod>(query.periodo)?.unwrap_or_default();
    let statistics = state.sale_service.statistics(&actor, period).await?;
    Ok(Json(SalesStatisticsResponse::from(statistics)))
}

pub async fn sales_by_period_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<SaleResponse>>> {
    let sales = state
        .sale_service
        .by_period(&actor, query.fecha_inicio, query.fecha_fin)
        .await?
        .into_iter()
        .map(SaleResponse::from)
        .collect();

    Ok(Json(sales))
}

pub async fn cancel_sale_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sale_id): Path<i64>,
) -> ApiResult<Json<SaleResponse>> {
    let sale = state.sale_service.cancel_sale(&actor, sale_id).await?;
    Ok(Json(SaleResponse::from(sale)))
}
