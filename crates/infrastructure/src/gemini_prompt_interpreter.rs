use async_trait::async_trait;
use serde::Deserialize;
use smartsales_application::{AiReportHints, PromptInterpreter};
use tracing::{debug, warn};
use url::Url;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generative-text interpretation of report prompts through the Gemini REST API.
///
/// Every failure (transport, status, malformed reply) degrades to `None`.
pub struct GeminiPromptInterpreter {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiPromptInterpreter {
    /// Creates an interpreter; the client should carry the request timeout.
    #[must_use]
    pub fn new(http_client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            model,
        }
    }

    /// Builds the generation request with the key in a header, never in the URL.
    fn build_request(&self, prompt: &str) -> Option<reqwest::Request> {
        let url = Url::parse(&format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model))
            .map_err(|error| warn!(error = %error, "invalid generative-text endpoint"))
            .ok()?;
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": instruction(prompt) }] }]
        });

        self.http_client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .build()
            .map_err(|error| {
                warn!(error = %error.without_url(), "generative-text request is invalid");
            })
            .ok()
    }
}

fn instruction(prompt: &str) -> String {
    format!(
        "Analiza el siguiente comando en español y devuelve un JSON plano \
         con las claves: tipo, formato, fecha_inicio, fecha_fin, agrupar_por, incluir_graficos. \
         Usa nombres compatibles con reportes empresariales \
         (ventas, productos, clientes, inventario, financiero). Comando: {prompt}"
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// Strips code fences, whitespace and an optional `json` tag around a model reply.
pub(crate) fn parse_hints(reply: &str) -> Option<AiReportHints> {
    let trimmed = reply.trim_matches(|character| matches!(character, '`' | '\n' | ' '));
    let body = trimmed.strip_prefix("json").unwrap_or(trimmed).trim();
    serde_json::from_str(body)
        .map_err(|error| debug!(error = %error, "generative-text reply is not valid JSON"))
        .ok()
}

#[async_trait]
impl PromptInterpreter for GeminiPromptInterpreter {
    async fn interpret(&self, prompt: &str) -> Option<AiReportHints> {
        let request = self.build_request(prompt)?;

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error.without_url(), "generative-text request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "generative-text request rejected");
            return None;
        }

        let reply = match response.json::<GenerateContentResponse>().await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(error = %error.without_url(), "generative-text reply could not be decoded");
                return None;
            }
        };

        let text = reply
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<String>();

        parse_hints(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{API_KEY_HEADER, GeminiPromptInterpreter, parse_hints};

    #[test]
    fn api_key_is_sent_as_header_and_kept_out_of_the_url() {
        let interpreter = GeminiPromptInterpreter::new(
            reqwest::Client::new(),
            "SECRET-KEY".to_owned(),
            "gemini-1.5-flash".to_owned(),
        );

        let Some(request) = interpreter.build_request("ventas de marzo en pdf") else {
            panic!("request should build");
        };

        assert!(!request.url().as_str().contains("SECRET-KEY"));
        assert!(request.url().query().is_none());
        assert!(request.url().path().ends_with("/gemini-1.5-flash:generateContent"));
        assert!(matches!(
            request.headers().get(API_KEY_HEADER).map(|value| value.to_str()),
            Some(Ok("SECRET-KEY"))
        ));
    }

    #[test]
    fn fenced_reply_is_parsed() {
        let reply = "```json\n{\"tipo\": \"clientes\", \"formato\": \"excel\", \"incluir_graficos\": false}\n```";
        let hints = parse_hints(reply);

        assert!(matches!(
            hints,
            Some(ref hints) if hints.tipo.as_deref() == Some("clientes")
                && hints.formato.as_deref() == Some("excel")
                && hints.incluir_graficos == Some(false)
        ));
    }

    #[test]
    fn prose_reply_yields_nothing() {
        assert!(parse_hints("No entiendo la solicitud").is_none());
    }
}
