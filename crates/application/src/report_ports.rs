use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use smartsales_core::AppResult;
use smartsales_domain::{Product, Report, ReportFormat, ReportParameters, ReportType, Sale};

use crate::report_service::ReportDataset;

/// Input for persisting a generated report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    /// Report subject.
    pub report_type: ReportType,
    /// Output format.
    pub format: ReportFormat,
    /// Requesting user.
    pub requested_by: i64,
    /// Stored artifact key.
    pub file_path: String,
    /// Parameters as opaque JSON.
    pub parameters: serde_json::Value,
    /// Range start.
    pub starts_on: Option<NaiveDate>,
    /// Range end.
    pub ends_on: Option<NaiveDate>,
    /// Description.
    pub description: String,
}

/// Report listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    /// Restrict to one requester.
    pub requested_by: Option<i64>,
    /// Restrict to one subject.
    pub report_type: Option<ReportType>,
    /// Restrict to one format.
    pub format: Option<ReportFormat>,
    /// Generated on or after this day.
    pub generated_since: Option<NaiveDate>,
}

/// Repository port for generated reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persists a report row.
    async fn create_report(&self, input: NewReport) -> AppResult<Report>;

    /// Finds a report.
    async fn find_report(&self, report_id: i64) -> AppResult<Option<Report>>;

    /// Lists reports newest first.
    async fn list_reports(&self, query: ReportQuery) -> AppResult<Vec<Report>>;

    /// Deletes a report row.
    async fn delete_report(&self, report_id: i64) -> AppResult<()>;
}

/// Per-customer purchase aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPurchaseSummary {
    /// Customer identifier.
    pub user_id: i64,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Paid purchases.
    pub purchases: i64,
    /// Lifetime paid spend.
    pub total_spent: Decimal,
    /// Registration timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Read-side queries feeding the report assembler.
#[async_trait]
pub trait ReportDataSource: Send + Sync {
    /// Paid sales with lines inside the inclusive range, newest first.
    async fn paid_sales(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>>;

    /// Listed products.
    async fn active_products(&self) -> AppResult<Vec<Product>>;

    /// Purchase aggregates for every user holding the customer role.
    async fn customer_summaries(&self) -> AppResult<Vec<CustomerPurchaseSummary>>;
}

/// Rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Artifact bytes.
    pub bytes: Vec<u8>,
    /// Suggested file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: &'static str,
}

/// Renders assembled datasets into PDF, spreadsheet or JSON artifacts.
pub trait ReportRenderer: Send + Sync {
    /// Renders `dataset` in the requested format.
    fn render(
        &self,
        dataset: &ReportDataset,
        parameters: &ReportParameters,
        generated_at: DateTime<Utc>,
    ) -> AppResult<RenderedReport>;
}

/// Storage for generated files.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores bytes under a relative key and returns the stored path.
    async fn save(&self, key: &str, bytes: &[u8]) -> AppResult<String>;

    /// Reads a stored file.
    async fn read(&self, path: &str) -> AppResult<Vec<u8>>;

    /// Removes a stored file; missing files are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Loose report hints returned by the generative-text service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AiReportHints {
    /// Report subject.
    pub tipo: Option<String>,
    /// Output format.
    pub formato: Option<String>,
    /// ISO start date.
    pub fecha_inicio: Option<String>,
    /// ISO end date.
    pub fecha_fin: Option<String>,
    /// Grouping key.
    pub agrupar_por: Option<String>,
    /// Chart toggle.
    pub incluir_graficos: Option<bool>,
}

/// Port for the optional generative-text interpretation.
#[async_trait]
pub trait PromptInterpreter: Send + Sync {
    /// Interprets a prompt; any failure yields `None`.
    async fn interpret(&self, prompt: &str) -> Option<AiReportHints>;
}

/// Uploaded audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Raw audio bytes.
    pub bytes: Vec<u8>,
}

/// Port for the speech-to-text service.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribes Spanish speech; `None` when the audio is unintelligible.
    async fn transcribe(&self, clip: AudioClip) -> AppResult<Option<String>>;
}
