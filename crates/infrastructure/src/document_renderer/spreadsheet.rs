use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet, XlsxError};
use smartsales_application::{ChartSeries, ReportDataset};
use smartsales_core::{AppError, AppResult};
use smartsales_domain::ReportParameters;

use super::layouts::{self, Section};

const CHART_SHEET: &str = "Grafico";
const SHEET_NAME_LIMIT: usize = 31;

pub(super) fn render_workbook(
    dataset: &ReportDataset,
    parameters: &ReportParameters,
    generated_at: DateTime<Utc>,
) -> AppResult<Vec<u8>> {
    build_workbook(dataset, parameters, generated_at)
        .map_err(|error| AppError::Internal(format!("failed to build spreadsheet: {error}")))
}

fn build_workbook(
    dataset: &ReportDataset,
    parameters: &ReportParameters,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, XlsxError> {
    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14);
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name("Resumen")?;
    summary.set_column_width(0, 30)?;
    summary.set_column_width(1, 24)?;
    summary.write_string_with_format(0, 0, parameters.report_type.title(), &title)?;
    summary.write_string(
        1,
        0,
        format!("Generado: {}", generated_at.format("%d/%m/%Y %H:%M")),
    )?;
    if !parameters.description.is_empty() {
        summary.write_string(2, 0, &parameters.description)?;
    }
    let mut row = 4;
    for (label, value) in layouts::summary(dataset) {
        summary.write_string_with_format(row, 0, label, &bold)?;
        write_cell(summary, row, 1, &value)?;
        row += 1;
    }

    for (index, section) in layouts::sections(dataset).iter().enumerate() {
        let name = sheet_name(section, index);
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_section(sheet, section, &bold)?;
    }

    if parameters.include_charts
        && let Some(series) = dataset.chart_series()
        && let Err(error) = add_chart_sheet(&mut workbook, &series, &bold)
    {
        tracing::warn!(error = %error, "skipping spreadsheet chart");
    }

    workbook.save_to_buffer()
}

fn write_section(sheet: &mut Worksheet, section: &Section, bold: &Format) -> Result<(), XlsxError> {
    for (column, header) in section.headers.iter().enumerate() {
        let column = column_index(column);
        sheet.write_string_with_format(0, column, *header, bold)?;
        sheet.set_column_width(column, 18)?;
    }
    for (row, cells) in section.rows.iter().enumerate() {
        let row = u32::try_from(row + 1).unwrap_or(u32::MAX);
        for (column, cell) in cells.iter().enumerate() {
            write_cell(sheet, row, column_index(column), cell)?;
        }
    }
    Ok(())
}

fn add_chart_sheet(
    workbook: &mut Workbook,
    series: &ChartSeries,
    bold: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(CHART_SHEET)?;
    sheet.write_string_with_format(0, 0, "Etiqueta", bold)?;
    sheet.write_string_with_format(0, 1, "Valor", bold)?;
    sheet.set_column_width(0, 24)?;
    for (index, (label, value)) in series.labels.iter().zip(&series.values).enumerate() {
        let row = u32::try_from(index + 1).unwrap_or(u32::MAX);
        sheet.write_string(row, 0, label)?;
        sheet.write_number(row, 1, *value)?;
    }

    let last = u32::try_from(series.values.len()).unwrap_or(u32::MAX);
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_categories((CHART_SHEET, 1, 0, last, 0))
        .set_values((CHART_SHEET, 1, 1, last, 1));
    chart.title().set_name(&series.title);
    sheet.insert_chart(1, 3, &chart)?;
    Ok(())
}

/// Writes numeric-looking cells as numbers so spreadsheet formulas work.
fn write_cell(sheet: &mut Worksheet, row: u32, column: u16, value: &str) -> Result<(), XlsxError> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => sheet.write_number(row, column, number)?,
        _ => sheet.write_string(row, column, value)?,
    };
    Ok(())
}

fn sheet_name(section: &Section, index: usize) -> String {
    let cleaned = section
        .title
        .chars()
        .filter(|character| !matches!(character, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect::<String>();
    let suffix = format!(" {}", index + 1);
    let kept = SHEET_NAME_LIMIT - suffix.chars().count();
    let mut name = cleaned.chars().take(kept).collect::<String>();
    name.push_str(&suffix);
    name
}

fn column_index(column: usize) -> u16 {
    u16::try_from(column).unwrap_or(u16::MAX)
}
