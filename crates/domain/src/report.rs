use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use smartsales_core::{AppError, AppResult};

/// Report subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Paid sales summary and detail.
    Ventas,
    /// Active product catalog.
    Productos,
    /// Customers with purchase totals.
    Clientes,
    /// Stock levels.
    Inventario,
    /// Revenue figures.
    Financiero,
}

impl ReportType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ventas => "ventas",
            Self::Productos => "productos",
            Self::Clientes => "clientes",
            Self::Inventario => "inventario",
            Self::Financiero => "financiero",
        }
    }

    /// Human title used in rendered documents.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Ventas => "Reporte de Ventas",
            Self::Productos => "Reporte de Productos",
            Self::Clientes => "Reporte de Clientes",
            Self::Inventario => "Reporte de Inventario",
            Self::Financiero => "Reporte Financiero",
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ventas" => Ok(Self::Ventas),
            "productos" => Ok(Self::Productos),
            "clientes" => Ok(Self::Clientes),
            "inventario" => Ok(Self::Inventario),
            "financiero" => Ok(Self::Financiero),
            other => Err(AppError::Validation(format!(
                "tipo de reporte no soportado '{other}'"
            ))),
        }
    }
}

/// Rendered artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// PDF document.
    Pdf,
    /// XLSX workbook.
    Excel,
    /// Pretty-printed JSON dataset.
    Json,
}

impl ReportFormat {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "excel",
            Self::Json => "json",
        }
    }

    /// File extension for stored artifacts.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
            Self::Json => "json",
        }
    }

    /// MIME type served on download.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Json => "application/json",
        }
    }

    /// Upper-case label used in descriptions.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Excel => "EXCEL",
            Self::Json => "JSON",
        }
    }
}

impl Display for ReportFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            "json" => Ok(Self::Json),
            other => Err(AppError::Validation(format!(
                "formato de reporte no soportado '{other}'"
            ))),
        }
    }
}

/// Grouping key for sales detail rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// By product.
    Producto,
    /// By customer.
    Cliente,
    /// By category.
    Categoria,
    /// By brand.
    Marca,
    /// By calendar day.
    Dia,
    /// By ISO week.
    Semana,
    /// By calendar month.
    Mes,
    /// By calendar year.
    Anio,
}

impl GroupBy {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Producto => "producto",
            Self::Cliente => "cliente",
            Self::Categoria => "categoria",
            Self::Marca => "marca",
            Self::Dia => "dia",
            Self::Semana => "semana",
            Self::Mes => "mes",
            Self::Anio => "anio",
        }
    }
}

impl Display for GroupBy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "producto" | "productos" => Ok(Self::Producto),
            "cliente" | "clientes" => Ok(Self::Cliente),
            "categoria" | "categoría" => Ok(Self::Categoria),
            "marca" => Ok(Self::Marca),
            "dia" | "día" => Ok(Self::Dia),
            "semana" => Ok(Self::Semana),
            "mes" => Ok(Self::Mes),
            "anio" | "año" => Ok(Self::Anio),
            other => Err(AppError::Validation(format!(
                "agrupación no soportada '{other}'"
            ))),
        }
    }
}

/// Canonical column selectors for sales detail projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    /// Customer username.
    NombreCliente,
    /// Purchase count.
    CantidadCompras,
    /// Order amount.
    MontoTotal,
    /// Order date.
    Fechas,
    /// Product names.
    Producto,
}

impl ReportField {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NombreCliente => "nombre_cliente",
            Self::CantidadCompras => "cantidad_compras",
            Self::MontoTotal => "monto_total",
            Self::Fechas => "fechas",
            Self::Producto => "producto",
        }
    }
}

impl FromStr for ReportField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "nombre_cliente" => Ok(Self::NombreCliente),
            "cantidad_compras" => Ok(Self::CantidadCompras),
            "monto_total" => Ok(Self::MontoTotal),
            "fechas" => Ok(Self::Fechas),
            "producto" => Ok(Self::Producto),
            _ => Err(AppError::Validation(format!("campo desconocido '{value}'"))),
        }
    }
}

/// Structured report request, serialized with the keys stored on the report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParameters {
    /// Report subject.
    #[serde(rename = "tipo")]
    pub report_type: ReportType,
    /// Output format.
    #[serde(rename = "formato")]
    pub format: ReportFormat,
    /// Inclusive start date.
    #[serde(rename = "fecha_inicio")]
    pub starts_on: Option<NaiveDate>,
    /// Inclusive end date.
    #[serde(rename = "fecha_fin")]
    pub ends_on: Option<NaiveDate>,
    /// Grouping for sales detail.
    #[serde(rename = "agrupar_por", skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupBy>,
    /// Field projection for sales detail.
    #[serde(rename = "campos", skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<ReportField>>,
    /// Human description.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Whether PDF and spreadsheet layouts include a chart.
    #[serde(rename = "incluir_graficos")]
    pub include_charts: bool,
}

impl ReportParameters {
    /// Rejects ranges whose end precedes their start.
    pub fn validate_range(&self) -> AppResult<()> {
        if let (Some(starts_on), Some(ends_on)) = (self.starts_on, self.ends_on) {
            if ends_on < starts_on {
                return Err(AppError::Validation(
                    "la fecha de fin no puede ser anterior a la fecha de inicio".to_owned(),
                ));
            }
        }

        Ok(())
    }

    /// Synthesized description, e.g. `Reporte de ventas del 01/09/2024 al 30/09/2024 (PDF)`.
    #[must_use]
    pub fn synthesize_description(&self) -> String {
        let mut description = format!("Reporte de {}", self.report_type);
        if let (Some(starts_on), Some(ends_on)) = (self.starts_on, self.ends_on) {
            description.push_str(&format!(
                " del {} al {}",
                starts_on.format("%d/%m/%Y"),
                ends_on.format("%d/%m/%Y")
            ));
        }
        if let Some(group_by) = self.group_by {
            description.push_str(&format!(", agrupado por {group_by}"));
        }
        description.push_str(&format!(" ({})", self.format.label()));
        description
    }

    /// Parameters as the opaque JSON record persisted on the report.
    pub fn to_json(&self) -> AppResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!("failed to serialize report parameters: {error}"))
        })
    }
}

/// Persisted generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Stable identifier.
    pub id: i64,
    /// Report subject.
    pub report_type: ReportType,
    /// Output format.
    pub format: ReportFormat,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Requesting user.
    pub requested_by: Option<i64>,
    /// Requesting username snapshot.
    pub requested_by_username: Option<String>,
    /// Stored artifact key.
    pub file_path: Option<String>,
    /// Parameters used, as opaque JSON.
    pub parameters: serde_json::Value,
    /// Range start.
    pub starts_on: Option<NaiveDate>,
    /// Range end.
    pub ends_on: Option<NaiveDate>,
    /// Description.
    pub description: String,
}

impl Report {
    /// Suggested download file name.
    #[must_use]
    pub fn download_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .map_or_else(
                || format!("reporte_{}.{}", self.id, self.format.extension()),
                ToOwned::to_owned,
            )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{GroupBy, ReportFormat, ReportParameters, ReportType};

    fn params() -> ReportParameters {
        ReportParameters {
            report_type: ReportType::Ventas,
            format: ReportFormat::Excel,
            starts_on: NaiveDate::from_ymd_opt(2024, 9, 1),
            ends_on: NaiveDate::from_ymd_opt(2024, 9, 30),
            group_by: Some(GroupBy::Cliente),
            fields: None,
            description: String::new(),
            include_charts: true,
        }
    }

    #[test]
    fn description_mentions_range_grouping_and_format() {
        assert_eq!(
            params().synthesize_description(),
            "Reporte de ventas del 01/09/2024 al 30/09/2024, agrupado por cliente (EXCEL)"
        );
    }

    #[test]
    fn parameters_serialize_with_string_dates_and_spanish_keys() {
        let value = params().to_json();
        let Ok(value) = value else {
            panic!("parameters must serialize");
        };

        assert_eq!(value["tipo"], "ventas");
        assert_eq!(value["formato"], "excel");
        assert_eq!(value["fecha_inicio"], "2024-09-01");
        assert_eq!(value["agrupar_por"], "cliente");
        assert!(value.get("campos").is_none());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut parameters = params();
        parameters.ends_on = NaiveDate::from_ymd_opt(2024, 8, 1);
        assert!(parameters.validate_range().is_err());
    }

    #[test]
    fn format_aliases_parse() {
        assert!(matches!("XLSX".parse::<ReportFormat>(), Ok(ReportFormat::Excel)));
        assert!("docx".parse::<ReportFormat>().is_err());
        assert!(matches!("año".parse::<GroupBy>(), Ok(GroupBy::Anio)));
    }
}
