use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smartsales_application::{GeneratedReport, PromptPreview, VoiceReport};
use smartsales_core::AppResult;
use smartsales_domain::{Report, ReportParameters};
use ts_rs::TS;

use super::common::{date, timestamp};

/// Incoming payload for structured report generation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-report-request.ts"
)]
pub struct GenerateReportRequest {
    pub tipo: String,
    pub formato: String,
    #[ts(type = "string | null")]
    pub fecha_inicio: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub fecha_fin: Option<NaiveDate>,
    #[serde(default)]
    pub descripcion: String,
    pub incluir_graficos: Option<bool>,
    pub agrupar_por: Option<String>,
}

/// Incoming natural-language prompt.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/prompt-request.ts"
)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub es_voz: bool,
}

/// Incoming transcribed voice command.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/voice-text-request.ts"
)]
pub struct VoiceTextRequest {
    #[serde(default)]
    pub texto_voz: String,
}

/// API representation of a generated report.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-response.ts"
)]
pub struct ReportResponse {
    pub id: i64,
    pub tipo: String,
    pub tipo_display: String,
    pub descripcion: String,
    pub fecha_generacion: String,
    pub generado_por: Option<i64>,
    pub generado_por_username: Option<String>,
    pub formato: String,
    pub formato_display: String,
    pub archivo: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub parametros: serde_json::Value,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

/// Structured generation result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/structured-report-response.ts"
)]
pub struct StructuredReportResponse {
    pub mensaje: String,
    pub reporte: ReportResponse,
}

/// Prompt-driven generation result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generated-report-response.ts"
)]
pub struct GeneratedReportResponse {
    pub mensaje: String,
    #[ts(type = "Record<string, unknown>")]
    pub prompt_interpretado: serde_json::Value,
    pub reporte: ReportResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texto_transcrito: Option<String>,
}

/// Interpretation preview.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/prompt-preview-response.ts"
)]
pub struct PromptPreviewResponse {
    #[ts(type = "Record<string, unknown>")]
    pub parametros_interpretados: serde_json::Value,
    pub confirmacion: String,
}

/// Filtered report history.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-history-response.ts"
)]
pub struct ReportHistoryResponse {
    pub count: usize,
    pub reportes: Vec<ReportResponse>,
}

impl GenerateReportRequest {
    pub fn into_parameters(self) -> AppResult<ReportParameters> {
        let report_type = self.tipo.parse()?;
        let format = self.formato.parse()?;
        let group_by = self
            .agrupar_por
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(str::parse)
            .transpose()?;

        Ok(ReportParameters {
            report_type,
            format,
            starts_on: self.fecha_inicio,
            ends_on: self.fecha_fin,
            group_by,
            fields: None,
            description: self.descripcion,
            include_charts: self.incluir_graficos.unwrap_or(true),
        })
    }
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            tipo: report.report_type.as_str().to_owned(),
            tipo_display: report.report_type.title().to_owned(),
            descripcion: report.description,
            fecha_generacion: timestamp(report.generated_at),
            generado_por: report.requested_by,
            generado_por_username: report.requested_by_username,
            formato: report.format.as_str().to_owned(),
            formato_display: report.format.label().to_owned(),
            archivo: report.file_path,
            parametros: report.parameters,
            fecha_inicio: report.starts_on.map(date),
            fecha_fin: report.ends_on.map(date),
        }
    }
}

impl StructuredReportResponse {
    pub fn new(report: Report) -> Self {
        Self {
            mensaje: "Reporte generado exitosamente".to_owned(),
            reporte: ReportResponse::from(report),
        }
    }
}

impl GeneratedReportResponse {
    pub fn from_generated(generated: GeneratedReport) -> AppResult<Self> {
        Ok(Self {
            mensaje: "Reporte generado exitosamente desde prompt".to_owned(),
            prompt_interpretado: generated.parameters.to_json()?,
            reporte: ReportResponse::from(generated.report),
            texto_transcrito: None,
        })
    }

    pub fn from_voice(voice: VoiceReport) -> AppResult<Self> {
        let mut response = Self::from_generated(voice.generated)?;
        response.texto_transcrito = Some(voice.transcript);
        Ok(response)
    }
}

impl PromptPreviewResponse {
    pub fn from_preview(preview: PromptPreview) -> AppResult<Self> {
        Ok(Self {
            parametros_interpretados: preview.parameters.to_json()?,
            confirmacion: preview.confirmation,
        })
    }
}

#[cfg(test)]
mod tests {
    use smartsales_core::AppError;
    use smartsales_domain::{GroupBy, ReportFormat, ReportType};

    use super::GenerateReportRequest;

    fn request(tipo: &str, formato: &str) -> GenerateReportRequest {
        GenerateReportRequest {
            tipo: tipo.to_owned(),
            formato: formato.to_owned(),
            fecha_inicio: None,
            fecha_fin: None,
            descripcion: String::new(),
            incluir_graficos: None,
            agrupar_por: Some("cliente".to_owned()),
        }
    }

    #[test]
    fn structured_request_maps_to_parameters() {
        let Ok(parameters) = request("ventas", "excel").into_parameters() else {
            panic!("request should be valid");
        };

        assert_eq!(parameters.report_type, ReportType::Ventas);
        assert_eq!(parameters.format, ReportFormat::Excel);
        assert_eq!(parameters.group_by, Some(GroupBy::Cliente));
        assert!(parameters.include_charts);
    }

    #[test]
    fn unsupported_type_or_format_is_a_validation_error() {
        assert!(matches!(
            request("nomina", "pdf").into_parameters(),
            Err(AppError::Validation(message)) if message.contains("nomina")
        ));
        assert!(matches!(
            request("ventas", "docx").into_parameters(),
            Err(AppError::Validation(_))
        ));
    }
}
