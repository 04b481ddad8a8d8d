use super::*;

const AUDIO_FIELD: &str = "archivo_audio";

pub async fn generate_from_audio_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<GeneratedReportResponse>)> {
    let clip = read_audio_clip(multipart).await?;
    let voice = state
        .report_service
        .generate_from_audio(&actor, clip)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GeneratedReportResponse::from_voice(voice)?),
    ))
}

async fn read_audio_clip(mut multipart: Multipart) -> Result<AudioClip, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(format!("formulario inválido: {error}")))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| audio_content_type(&file_name).to_owned());
        if !is_supported_audio(&file_name) {
            return Err(AppError::Validation(
                "Formato de audio no soportado. Use WAV o MP3".to_owned(),
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::Validation(format!("audio ilegible: {error}")))?;

        return Ok(AudioClip {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::Validation(
        "Se requiere un archivo de audio".to_owned(),
    ))
}

fn is_supported_audio(file_name: &str) -> bool {
    let lowered = file_name.to_ascii_lowercase();
    lowered.ends_with(".wav") || lowered.ends_with(".mp3")
}

fn audio_content_type(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".mp3") {
        "audio/mpeg"
    } else {
        "audio/wav"
    }
}
