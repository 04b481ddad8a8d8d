use async_trait::async_trait;
use serde::Deserialize;
use smartsales_application::{AudioClip, SpeechTranscriber};
use smartsales_core::{AppError, AppResult};
use tracing::debug;
use url::Url;

const LANGUAGE: &str = "es-ES";

/// Speech-to-text client for recognizer endpoints that answer with
/// newline-separated JSON result documents.
pub struct HttpSpeechTranscriber {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSpeechTranscriber {
    /// Creates a transcriber for the given recognizer endpoint.
    #[must_use]
    pub fn new(http_client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecognitionDocument {
    #[serde(default)]
    result: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternative: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    transcript: String,
}

/// First non-empty transcript across the result documents.
pub(crate) fn first_transcript(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<RecognitionDocument>(line).ok())
        .flat_map(|document| document.result)
        .flat_map(|result| result.alternative)
        .map(|alternative| alternative.transcript.trim().to_owned())
        .find(|transcript| !transcript.is_empty())
}

#[async_trait]
impl SpeechTranscriber for HttpSpeechTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> AppResult<Option<String>> {
        let mut params = vec![("client", "chromium"), ("lang", LANGUAGE)];
        if let Some(api_key) = self.api_key.as_deref() {
            params.push(("key", api_key));
        }
        let url = Url::parse_with_params(&self.endpoint, params).map_err(|error| {
            AppError::Internal(format!("invalid speech-to-text endpoint: {error}"))
        })?;

        debug!(file_name = %clip.file_name, bytes = clip.bytes.len(), "sending audio to speech-to-text");
        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, clip.content_type.as_str())
            .body(clip.bytes)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "speech-to-text transport error: {}",
                    error.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "speech-to-text service answered with status {status}"
            )));
        }

        let body = response.text().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read speech-to-text reply: {}",
                error.without_url()
            ))
        })?;

        Ok(first_transcript(&body))
    }
}
