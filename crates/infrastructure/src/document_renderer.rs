//! PDF, spreadsheet and JSON rendering of report datasets and sale notes.

mod layouts;
mod pdf;
mod spreadsheet;


use chrono::{DateTime, Utc};
use smartsales_application::{
    RenderedReport, ReportDataset, ReportRenderer, SaleNoteRenderer, report_file_name,
};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::{ReportFormat, ReportParameters, Sale};

use self::pdf::{Face, PdfBuilder};

/// Stateless renderer for every downloadable document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Creates the renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for DocumentRenderer {
    fn render(
        &self,
        dataset: &ReportDataset,
        parameters: &ReportParameters,
        generated_at: DateTime<Utc>,
    ) -> AppResult<RenderedReport> {
        if dataset.report_type() != parameters.report_type {
            return Err(AppError::Validation(format!(
                "los datos no corresponden a un reporte de {}",
                parameters.report_type.as_str()
            )));
        }

        let bytes = match parameters.format {
            ReportFormat::Pdf => layouts::render_pdf(dataset, parameters, generated_at),
            ReportFormat::Excel => spreadsheet::render_workbook(dataset, parameters, generated_at)?,
            ReportFormat::Json => serde_json::to_vec_pretty(dataset).map_err(|error| {
                AppError::Internal(format!("failed to serialize report dataset: {error}"))
            })?,
        };

        Ok(RenderedReport {
            bytes,
            file_name: report_file_name(parameters, generated_at),
            content_type: parameters.format.content_type(),
        })
    }
}

impl SaleNoteRenderer for DocumentRenderer {
    fn render_sale_note(&self, sale: &Sale) -> AppResult<Vec<u8>> {
        let mut document = PdfBuilder::new();
        document.line("SmartSales365", 18.0, Face::Bold);
        document.line(&format!("Nota de Venta #{}", sale.id), 14.0, Face::Bold);
        document.gap(8.0);
        document.field("Cliente", &sale.customer_username);
        document.field("Fecha", &sale.created_at.format("%d/%m/%Y %H:%M").to_string());
        document.field("Estado", sale.status.as_str());
        document.gap(10.0);

        let rows = sale
            .lines
            .iter()
            .map(|line| {
                vec![
                    line.product_name.clone(),
                    line.quantity.to_string(),
                    format!("{:.2}", line.unit_price),
                    format!("{:.2}", line.subtotal),
                ]
            })
            .collect::<Vec<_>>();
        document.table(
            &["Producto", "Cantidad", "Precio unitario", "Subtotal"],
            &rows,
            "Sin productos",
        );
        document.gap(10.0);
        document.field("Total", &format!("{:.2}", sale.total));

        Ok(document.finish())
    }
}
