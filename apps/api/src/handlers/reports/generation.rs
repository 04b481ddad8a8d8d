use super::*;

pub async fn generate_structured_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<GenerateReportRequest>,
) -> ApiResult<(StatusCode, Json<StructuredReportResponse>)> {
    let report = state
        .report_service
        .generate_structured(&actor, payload.into_parameters()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StructuredReportResponse::new(report)),
    ))
}

pub async fn generate_dynamic_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<PromptRequest>,
) -> ApiResult<(StatusCode, Json<GeneratedReportResponse>)> {
    let generated = state
        .report_service
        .generate_from_prompt(&actor, &payload.prompt, payload.es_voz)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GeneratedReportResponse::from_generated(generated)?),
    ))
}

pub async fn generate_from_voice_text_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<VoiceTextRequest>,
) -> ApiResult<(StatusCode, Json<GeneratedReportResponse>)> {
    let generated = state
        .report_service
        .generate_from_prompt(&actor, &payload.texto_voz, true)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GeneratedReportResponse::from_generated(generated)?),
    ))
}

pub async fn preview_prompt_handler(
    State(state): State<AppState>,
    Json(payload): Json<PromptRequest>,
) -> ApiResult<Json<PromptPreviewResponse>> {
    let preview = state.report_service.preview(&payload.prompt).await?;
    Ok(Json(PromptPreviewResponse::from_preview(preview)?))
}
