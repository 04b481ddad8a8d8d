use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use smartsales_core::{ActorContext, AppError, AppResult};
use smartsales_domain::{Report, ReportParameters};
use tracing::{info, warn};

use crate::{
    AudioClip, AuditRecorder, DocumentStore, NewReport, PromptInterpreter, ReportDataSource,
    ReportQuery, ReportRenderer, ReportRepository, SpeechTranscriber,
};

mod assembler;
mod dataset;
mod prompt_parser;

#[cfg(test)]
mod tests;

pub use assembler::{LOW_STOCK_THRESHOLD, ReportAssembler, SALES_DETAIL_LIMIT};
pub use dataset::{
    ChartSeries, CustomerRow, CustomersReportData, FinancialReportData, InventoryReportData,
    LowStockRow, ProductRow, ProductsReportData, ProjectedSaleRow, ReportDataset, ReportPeriod,
    SaleSummaryRow, SalesBucket, SalesDetail, SalesReportData,
};
pub use prompt_parser::{ParsedPrompt, parse_prompt};

const DESCRIPTION_LIMIT: usize = 100;
const AUDIT_PROMPT_PREFIX: usize = 50;

/// Interpreted prompt together with the confirmation sentence shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPreview {
    /// Parameters the prompt resolves to.
    pub parameters: ReportParameters,
    /// Human confirmation text.
    pub confirmation: String,
}

/// Stored report plus the parameters it was generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    /// Persisted report row.
    pub report: Report,
    /// Interpreted parameters.
    pub parameters: ReportParameters,
}

/// Report generated from an uploaded voice clip.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceReport {
    /// Text recognised in the clip.
    pub transcript: String,
    /// Generation result.
    pub generated: GeneratedReport,
}

/// Stored artifact ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    /// File bytes.
    pub bytes: Vec<u8>,
    /// Attachment file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct PromptOrigin<'a> {
    prompt: &'a str,
    voice: bool,
}

/// Application service for report interpretation, generation and history.
#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    assembler: ReportAssembler,
    renderer: Arc<dyn ReportRenderer>,
    documents: Arc<dyn DocumentStore>,
    audit: AuditRecorder,
    interpreter: Option<Arc<dyn PromptInterpreter>>,
    transcriber: Option<Arc<dyn SpeechTranscriber>>,
}

impl ReportService {
    /// Creates a new report service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        data_source: Arc<dyn ReportDataSource>,
        renderer: Arc<dyn ReportRenderer>,
        documents: Arc<dyn DocumentStore>,
        audit: AuditRecorder,
        interpreter: Option<Arc<dyn PromptInterpreter>>,
        transcriber: Option<Arc<dyn SpeechTranscriber>>,
    ) -> Self {
        Self {
            repository,
            assembler: ReportAssembler::new(data_source),
            renderer,
            documents,
            audit,
            interpreter,
            transcriber,
        }
    }

    /// Interprets a prompt with rules, consulting the AI service only when
    /// subject or format are still missing. Never fails.
    pub async fn interpret_prompt(&self, prompt: &str) -> ReportParameters {
        let today = Utc::now().date_naive();
        let mut parsed = parse_prompt(prompt, today);

        if parsed.needs_ai()
            && let Some(interpreter) = &self.interpreter
        {
            match interpreter.interpret(prompt).await {
                Some(hints) => parsed.merge_ai_hints(hints),
                None => info!("ai interpretation unavailable, keeping rule result"),
            }
        }

        parsed.into_parameters(today)
    }

    /// Interprets a prompt without generating anything.
    pub async fn preview(&self, prompt: &str) -> AppResult<PromptPreview> {
        let prompt = required_prompt(prompt)?;
        let parameters = self.interpret_prompt(prompt).await;
        let confirmation = confirmation_text(&parameters);

        Ok(PromptPreview {
            parameters,
            confirmation,
        })
    }

    /// Generates a report from a typed or transcribed prompt.
    pub async fn generate_from_prompt(
        &self,
        actor: &ActorContext,
        prompt: &str,
        voice: bool,
    ) -> AppResult<GeneratedReport> {
        let prompt = required_prompt(prompt)?;
        let parameters = self.interpret_prompt(prompt).await;
        let origin = PromptOrigin { prompt, voice };
        let channel = if voice { "comando de voz" } else { "prompt de texto" };

        let report = self
            .audit
            .audited(
                actor,
                &format!("Generar reporte dinámico de {}", parameters.report_type),
                self.generate(actor, &parameters, Some(origin)),
                |report: &Report| {
                    format!(
                        "Generó reporte dinámico de {} mediante {channel}: '{}...'",
                        report.report_type,
                        truncate_chars(prompt, AUDIT_PROMPT_PREFIX)
                    )
                },
            )
            .await?;

        Ok(GeneratedReport { report, parameters })
    }

    /// Transcribes an audio clip and generates a report from the transcript.
    pub async fn generate_from_audio(
        &self,
        actor: &ActorContext,
        clip: AudioClip,
    ) -> AppResult<VoiceReport> {
        if clip.bytes.is_empty() {
            return Err(AppError::Validation(
                "Se requiere un archivo de audio".to_owned(),
            ));
        }
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            AppError::Internal("speech-to-text service is not configured".to_owned())
        })?;

        let transcript = transcriber
            .transcribe(clip)
            .await?
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AppError::Validation("No se pudo entender el audio".to_owned())
            })?;

        let generated = self.generate_from_prompt(actor, &transcript, true).await?;
        Ok(VoiceReport {
            transcript,
            generated,
        })
    }

    /// Generates a report from explicit parameters.
    pub async fn generate_structured(
        &self,
        actor: &ActorContext,
        mut parameters: ReportParameters,
    ) -> AppResult<Report> {
        parameters.validate_range()?;
        if parameters.description.trim().is_empty() {
            parameters.description = parameters.synthesize_description();
        }

        self.audit
            .audited(
                actor,
                &format!("Generar reporte de {}", parameters.report_type),
                self.generate(actor, &parameters, None),
                |report: &Report| {
                    format!(
                        "Generó reporte de {} en formato {}",
                        report.report_type, report.format
                    )
                },
            )
            .await
    }

    /// Lists reports; non-administrators only see their own.
    pub async fn list_reports(
        &self,
        actor: &ActorContext,
        mut query: ReportQuery,
    ) -> AppResult<Vec<Report>> {
        if !actor.is_admin() {
            query.requested_by = Some(actor.user_id());
        }

        self.repository.list_reports(query).await
    }

    /// Returns one report visible to the actor.
    pub async fn get_report(&self, actor: &ActorContext, report_id: i64) -> AppResult<Report> {
        let report = self
            .repository
            .find_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("reporte {report_id} no encontrado")))?;
        match report.requested_by {
            Some(owner_id) => actor.require_owner_or_admin(owner_id)?,
            None => actor.require_admin()?,
        }
        Ok(report)
    }

    /// Reads the stored artifact of a report.
    pub async fn download(&self, actor: &ActorContext, report_id: i64) -> AppResult<ReportDownload> {
        let report = self.get_report(actor, report_id).await?;
        let path = report.file_path.as_deref().ok_or_else(|| {
            AppError::NotFound(format!("el reporte {report_id} no tiene archivo"))
        })?;

        let bytes = self.documents.read(path).await?;
        self.audit
            .record(actor, format!("Descargó reporte ID {report_id}"), true)
            .await;

        Ok(ReportDownload {
            bytes,
            file_name: report.download_name(),
            content_type: report.format.content_type(),
        })
    }

    /// Deletes a report row and its stored file.
    pub async fn delete_report(&self, actor: &ActorContext, report_id: i64) -> AppResult<()> {
        let report = self.get_report(actor, report_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar reporte ID {report_id}"),
                self.repository.delete_report(report_id),
                |_| format!("Eliminó reporte ID {report_id} ({})", report.report_type),
            )
            .await?;

        if let Some(path) = report.file_path.as_deref() {
            if let Err(error) = self.documents.delete(path).await {
                warn!(report_id, error = %error, "failed to remove report file");
            }
        }

        Ok(())
    }

    async fn generate(
        &self,
        actor: &ActorContext,
        parameters: &ReportParameters,
        origin: Option<PromptOrigin<'_>>,
    ) -> AppResult<Report> {
        parameters.validate_range()?;
        let generated_at = Utc::now();

        let dataset = self.assembler.assemble(parameters).await?;
        let rendered = self.renderer.render(&dataset, parameters, generated_at)?;
        let key = storage_key(actor.user_id(), &rendered.file_name)?;
        let file_path = self.documents.save(&key, &rendered.bytes).await?;

        let input = NewReport {
            report_type: parameters.report_type,
            format: parameters.format,
            requested_by: actor.user_id(),
            file_path: file_path.clone(),
            parameters: stored_parameters(parameters, origin)?,
            starts_on: parameters.starts_on,
            ends_on: parameters.ends_on,
            description: stored_description(parameters, origin),
        };

        match self.repository.create_report(input).await {
            Ok(report) => {
                info!(
                    report_id = report.id,
                    report_type = %report.report_type,
                    format = %report.format,
                    "report generated"
                );
                Ok(report)
            }
            Err(error) => {
                if let Err(cleanup) = self.documents.delete(&file_path).await {
                    warn!(%file_path, error = %cleanup, "failed to remove orphaned report file");
                }
                Err(error)
            }
        }
    }
}

/// File name for a report rendered at `generated_at`.
#[must_use]
pub fn report_file_name(parameters: &ReportParameters, generated_at: DateTime<Utc>) -> String {
    format!(
        "reporte_{}_{}.{}",
        parameters.report_type,
        generated_at.format("%Y%m%d_%H%M%S"),
        parameters.format.extension()
    )
}

/// Storage key for a rendered report, unique per generation so that
/// concurrent reports never share a file.
fn storage_key(user_id: i64, file_name: &str) -> AppResult<String> {
    let mut nonce = [0u8; 5];
    getrandom::fill(&mut nonce).map_err(|error| {
        AppError::Internal(format!("failed to generate report file suffix: {error}"))
    })?;
    let suffix = nonce
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();

    Ok(match file_name.rsplit_once('.') {
        Some((stem, extension)) => format!("reportes/{user_id}_{stem}_{suffix}.{extension}"),
        None => format!("reportes/{user_id}_{file_name}_{suffix}"),
    })
}

fn required_prompt(prompt: &str) -> AppResult<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Se requiere un prompt".to_owned()));
    }
    Ok(prompt)
}

fn confirmation_text(parameters: &ReportParameters) -> String {
    let mut text = format!("Se generará un reporte de {}", parameters.report_type);
    if let (Some(starts_on), Some(ends_on)) = (parameters.starts_on, parameters.ends_on) {
        text.push_str(&format!(" del {starts_on} al {ends_on}"));
    }
    if let Some(group_by) = parameters.group_by {
        text.push_str(&format!(", agrupado por {group_by}"));
    }
    text.push_str(&format!(" en formato {}", parameters.format.label()));
    text
}

fn stored_parameters(
    parameters: &ReportParameters,
    origin: Option<PromptOrigin<'_>>,
) -> AppResult<Value> {
    let mut value = parameters.to_json()?;
    if let (Some(origin), Value::Object(map)) = (origin, &mut value) {
        map.insert(
            "prompt_original".to_owned(),
            Value::String(origin.prompt.to_owned()),
        );
        map.insert("es_voz".to_owned(), Value::Bool(origin.voice));
    }
    Ok(value)
}

fn stored_description(parameters: &ReportParameters, origin: Option<PromptOrigin<'_>>) -> String {
    let mut description = parameters.description.clone();
    if origin.is_some_and(|origin| origin.voice) {
        description.push_str(" (comando de voz)");
    }

    if description.chars().count() > DESCRIPTION_LIMIT {
        let mut truncated = truncate_chars(&description, DESCRIPTION_LIMIT - 3).to_owned();
        truncated.push_str("...");
        return truncated;
    }
    description
}

fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
