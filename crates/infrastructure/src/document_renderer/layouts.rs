use chrono::{DateTime, Utc};
use smartsales_application::{ReportDataset, SalesBucket};
use smartsales_domain::ReportParameters;

use super::pdf::{Face, PdfBuilder};

/// Shown under a table header when a section has no rows.
pub(super) const EMPTY_SECTION_NOTE: &str = "Sin registros";

/// Tabular block shared by the PDF and spreadsheet layouts.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Section {
    pub(super) title: String,
    pub(super) headers: Vec<&'static str>,
    pub(super) rows: Vec<Vec<String>>,
}

/// Headline figures for the summary block.
pub(super) fn summary(dataset: &ReportDataset) -> Vec<(&'static str, String)> {
    match dataset {
        ReportDataset::Sales(data) => vec![
            ("Total de ventas", money(data.total_ventas)),
            ("Cantidad de ventas", data.cantidad_ventas.to_string()),
            ("Ticket promedio", money(data.ticket_promedio)),
            ("Productos vendidos", data.productos_vendidos.to_string()),
        ],
        ReportDataset::Products(data) => vec![
            ("Total de productos", data.total_productos.to_string()),
            ("Valor del inventario", money(data.valor_inventario)),
        ],
        ReportDataset::Customers(data) => {
            vec![("Total de clientes", data.total_clientes.to_string())]
        }
        ReportDataset::Inventory(data) => vec![
            ("Total de productos", data.total_productos.to_string()),
            ("Productos con bajo stock", data.productos_bajo_stock.to_string()),
            ("Productos sin stock", data.productos_sin_stock.to_string()),
            ("Valor total del inventario", money(data.valor_total_inventario)),
        ],
        ReportDataset::Financial(data) => vec![
            ("Ingresos totales", money(data.ingresos_totales)),
            ("Cantidad de transacciones", data.cantidad_transacciones.to_string()),
            ("Ticket promedio", money(data.ticket_promedio)),
            (
                "Periodo",
                format!(
                    "{} a {}",
                    data.periodo.fecha_inicio.as_deref().unwrap_or("inicio"),
                    data.periodo.fecha_fin.as_deref().unwrap_or("hoy")
                ),
            ),
        ],
    }
}

/// Detail tables in display order; empty tables are omitted, except the
/// low-stock list which is always present for inventory reports.
pub(super) fn sections(dataset: &ReportDataset) -> Vec<Section> {
    let mut sections = Vec::new();
    match dataset {
        ReportDataset::Sales(data) => {
            let (headers, rows) = data.ventas_detalle.table();
            if !rows.is_empty() {
                sections.push(Section {
                    title: "Detalle de ventas".to_owned(),
                    headers,
                    rows,
                });
            }
            for (grouping, buckets) in &data.groupings {
                if buckets.is_empty() {
                    continue;
                }
                sections.push(Section {
                    title: grouping_title(grouping),
                    headers: vec!["Grupo", "Cantidad", "Total"],
                    rows: buckets.iter().map(bucket_row).collect(),
                });
            }
        }
        ReportDataset::Products(data) if !data.productos.is_empty() => sections.push(Section {
            title: "Productos".to_owned(),
            headers: vec!["ID", "Nombre", "Marca", "Categoría", "Precio", "Stock"],
            rows: data
                .productos
                .iter()
                .map(|row| {
                    vec![
                        row.id.to_string(),
                        row.nombre.clone(),
                        row.marca.clone(),
                        row.categoria.clone(),
                        money(row.precio),
                        row.stock.to_string(),
                    ]
                })
                .collect(),
        }),
        ReportDataset::Customers(data) if !data.clientes.is_empty() => sections.push(Section {
            title: "Clientes".to_owned(),
            headers: vec!["ID", "Usuario", "Email", "Compras", "Total", "Registro"],
            rows: data
                .clientes
                .iter()
                .map(|row| {
                    vec![
                        row.id.to_string(),
                        row.username.clone(),
                        row.email.clone(),
                        row.cantidad_compras.to_string(),
                        money(row.total_compras),
                        row.fecha_registro.clone(),
                    ]
                })
                .collect(),
        }),
        ReportDataset::Inventory(data) => {
            sections.push(Section {
                title: "Productos con bajo stock".to_owned(),
                headers: vec!["Nombre", "Stock", "Precio"],
                rows: data
                    .productos_bajo_stock_detalle
                    .iter()
                    .map(|row| vec![row.nombre.clone(), row.stock.to_string(), money(row.precio)])
                    .collect(),
            });
        }
        _ => {}
    }
    sections
}

pub(super) fn render_pdf(
    dataset: &ReportDataset,
    parameters: &ReportParameters,
    generated_at: DateTime<Utc>,
) -> Vec<u8> {
    let mut document = PdfBuilder::new();
    document.line(parameters.report_type.title(), 18.0, Face::Bold);
    document.line(
        &format!("Generado: {}", generated_at.format("%d/%m/%Y %H:%M")),
        9.0,
        Face::Regular,
    );
    if parameters.starts_on.is_some() || parameters.ends_on.is_some() {
        document.line(&period_line(parameters), 9.0, Face::Regular);
    }
    if !parameters.description.is_empty() {
        document.line(&parameters.description, 9.0, Face::Regular);
    }

    document.gap(12.0);
    document.line("Resumen", 13.0, Face::Bold);
    for (label, value) in summary(dataset) {
        document.field(label, &value);
    }

    if parameters.include_charts
        && let Some(series) = dataset.chart_series()
    {
        document.gap(12.0);
        document.bar_chart(&series);
    }

    for section in sections(dataset) {
        document.gap(12.0);
        document.line(&section.title, 12.0, Face::Bold);
        document.table(&section.headers, &section.rows, EMPTY_SECTION_NOTE);
    }

    document.finish()
}

fn period_line(parameters: &ReportParameters) -> String {
    let from = parameters
        .starts_on
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "inicio".to_owned());
    let to = parameters
        .ends_on
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "hoy".to_owned());
    format!("Periodo: {from} - {to}")
}

pub(super) fn grouping_title(key: &str) -> String {
    let criterion = key.strip_prefix("ventas_por_").unwrap_or(key);
    format!("Ventas por {criterion}")
}

fn bucket_row((label, bucket): (&String, &SalesBucket)) -> Vec<String> {
    vec![label.clone(), bucket.cantidad.to_string(), money(bucket.total)]
}

pub(super) fn money(value: f64) -> String {
    format!("{value:.2}")
}
