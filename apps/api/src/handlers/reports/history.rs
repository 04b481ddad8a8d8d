use super::*;

#[derive(Debug, serde::Deserialize)]
pub struct ReportHistoryQuery {
    pub tipo: Option<String>,
    pub formato: Option<String>,
    pub fecha_desde: Option<NaiveDate>,
}

pub async fn list_reports_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<ReportResponse>>> {
    let reports = state
        .report_service
        .list_reports(&actor, ReportQuery::default())
        .await?
        .into_iter()
        .map(ReportResponse::from)
        .collect();

    Ok(Json(reports))
}

pub async fn report_history_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<ReportHistoryQuery>,
) -> ApiResult<Json<ReportHistoryResponse>> {
    let filter = ReportQuery {
        requested_by: None,
        report_type: parse_optional::<ReportType>(query.tipo)?,
        format: parse_optional::<ReportFormat>(query.formato)?,
        generated_since: query.fecha_desde,
    };
    let reportes: Vec<ReportResponse> = state
        .report_service
        .list_reports(&actor, filter)
        .await?
        .into_iter()
        .map(ReportResponse::from)
        .collect();

    Ok(Json(ReportHistoryResponse {
        count: reportes.len(),
        reportes,
    }))
}

pub async fn get_report_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state.report_service.get_report(&actor, report_id).await?;
    Ok(Json(ReportResponse::from(report)))
}

pub async fn download_report_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(report_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let download = state.report_service.download(&actor, report_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", download.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    ))
}

pub async fn delete_report_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(report_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .report_service
        .delete_report(&actor, report_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
