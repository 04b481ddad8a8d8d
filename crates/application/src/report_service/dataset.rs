use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use smartsales_domain::{ReportType, Sale};

/// Assembled report data, serialized with the keys consumers of the JSON
/// format rely on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportDataset {
    /// Sales summary and detail.
    Sales(SalesReportData),
    /// Product catalog listing.
    Products(ProductsReportData),
    /// Customer purchase listing.
    Customers(CustomersReportData),
    /// Stock health summary.
    Inventory(InventoryReportData),
    /// Revenue summary.
    Financial(FinancialReportData),
}

impl ReportDataset {
    /// Subject this dataset was assembled for.
    #[must_use]
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::Sales(_) => ReportType::Ventas,
            Self::Products(_) => ReportType::Productos,
            Self::Customers(_) => ReportType::Clientes,
            Self::Inventory(_) => ReportType::Inventario,
            Self::Financial(_) => ReportType::Financiero,
        }
    }

    /// Series plotted by chart-capable renderers.
    #[must_use]
    pub fn chart_series(&self) -> Option<ChartSeries> {
        let (title, points): (&str, Vec<(String, f64)>) = match self {
            Self::Sales(data) => ("Ventas por mes", data.monthly_totals.clone()),
            Self::Products(data) => (
                "Stock por producto",
                data.productos
                    .iter()
                    .take(CHART_POINTS)
                    .map(|row| (row.nombre.clone(), f64::from(row.stock)))
                    .collect(),
            ),
            Self::Customers(data) => {
                let mut rows = data.clientes.iter().collect::<Vec<_>>();
                rows.sort_by(|left, right| right.total_compras.total_cmp(&left.total_compras));
                (
                    "Clientes con mayor gasto",
                    rows.into_iter()
                        .take(CHART_POINTS)
                        .map(|row| (row.username.clone(), row.total_compras))
                        .collect(),
                )
            }
            Self::Inventory(data) => (
                "Productos con bajo stock",
                data.productos_bajo_stock_detalle
                    .iter()
                    .take(CHART_POINTS)
                    .map(|row| (row.nombre.clone(), f64::from(row.stock)))
                    .collect(),
            ),
            Self::Financial(data) => (
                "Resumen financiero",
                vec![
                    ("Ingresos totales".to_owned(), data.ingresos_totales),
                    ("Ticket promedio".to_owned(), data.ticket_promedio),
                ],
            ),
        };

        if points.is_empty() {
            return None;
        }

        let (labels, values) = points.into_iter().unzip();
        Some(ChartSeries {
            title: title.to_owned(),
            labels,
            values,
        })
    }
}

const CHART_POINTS: usize = 10;

/// One labelled bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Chart title.
    pub title: String,
    /// Category labels.
    pub labels: Vec<String>,
    /// Values aligned with `labels`.
    pub values: Vec<f64>,
}

/// Sales dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReportData {
    /// Sum of paid sale totals.
    pub total_ventas: f64,
    /// Paid sale count.
    pub cantidad_ventas: usize,
    /// Average ticket, zero when there are no sales.
    pub ticket_promedio: f64,
    /// Units across all lines.
    pub productos_vendidos: i64,
    /// Full or projected detail rows.
    pub ventas_detalle: SalesDetail,
    /// Grouped buckets keyed `ventas_por_{criterio}`.
    #[serde(flatten)]
    pub groupings: BTreeMap<String, BTreeMap<String, SalesBucket>>,
    /// Month totals used for charts.
    #[serde(skip)]
    pub monthly_totals: Vec<(String, f64)>,
}

/// Sales detail rows, either complete or projected to selected fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SalesDetail {
    /// Every column.
    Full(Vec<SaleSummaryRow>),
    /// Only the requested columns.
    Projected(Vec<ProjectedSaleRow>),
}

impl SalesDetail {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Full(rows) => rows.len(),
            Self::Projected(rows) => rows.len(),
        }
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column headers and stringified cells for tabular renderers.
    #[must_use]
    pub fn table(&self) -> (Vec<&'static str>, Vec<Vec<String>>) {
        match self {
            Self::Full(rows) => (
                vec!["ID", "Cliente", "Fecha", "Total", "Estado", "Productos"],
                rows.iter()
                    .map(|row| {
                        vec![
                            row.id.to_string(),
                            row.usuario.clone(),
                            row.fecha.clone(),
                            format!("{:.2}", row.total),
                            row.estado.clone(),
                            row.producto.clone(),
                        ]
                    })
                    .collect(),
            ),
            Self::Projected(rows) => {
                let Some(first) = rows.first() else {
                    return (Vec::new(), Vec::new());
                };
                let headers = first.cells().into_iter().map(|(header, _)| header).collect();
                let cells = rows
                    .iter()
                    .map(|row| row.cells().into_iter().map(|(_, cell)| cell).collect())
                    .collect();
                (headers, cells)
            }
        }
    }
}

/// One paid sale as listed in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleSummaryRow {
    /// Sale identifier.
    pub id: i64,
    /// Customer username.
    pub usuario: String,
    /// `dd/mm/YYYY HH:MM`.
    pub fecha: String,
    /// Sale total.
    pub total: f64,
    /// Status label.
    pub estado: String,
    /// Comma-joined product names.
    pub producto: String,
    #[serde(skip)]
    pub(crate) created_at: DateTime<Utc>,
}

impl SaleSummaryRow {
    pub(crate) fn from_sale(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            usuario: sale.customer_username.clone(),
            fecha: sale.created_at.format("%d/%m/%Y %H:%M").to_string(),
            total: money(sale.total),
            estado: status_label(sale.status.as_str()),
            producto: sale.product_names(),
            created_at: sale.created_at,
        }
    }
}

/// Sales row restricted to requested columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectedSaleRow {
    /// Customer username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    /// Always one; each row is one purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cantidad_compras: Option<u32>,
    /// Sale total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monto_total: Option<f64>,
    /// Sale date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    /// Product names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producto: Option<String>,
}

impl ProjectedSaleRow {
    fn cells(&self) -> Vec<(&'static str, String)> {
        let mut cells = Vec::new();
        if let Some(cliente) = &self.cliente {
            cells.push(("Cliente", cliente.clone()));
        }
        if let Some(cantidad) = self.cantidad_compras {
            cells.push(("Cantidad", cantidad.to_string()));
        }
        if let Some(monto) = self.monto_total {
            cells.push(("Monto total", format!("{monto:.2}")));
        }
        if let Some(fecha) = &self.fecha {
            cells.push(("Fecha", fecha.clone()));
        }
        if let Some(producto) = &self.producto {
            cells.push(("Producto", producto.clone()));
        }
        cells
    }
}

/// Group of sales sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBucket {
    /// Sum of totals in the bucket.
    pub total: f64,
    /// Sales in the bucket.
    pub cantidad: usize,
    /// Member rows.
    pub ventas: Vec<SaleSummaryRow>,
}

/// Products dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsReportData {
    /// Listed product count.
    pub total_productos: usize,
    /// Sum of price times stock.
    pub valor_inventario: f64,
    /// Product rows.
    pub productos: Vec<ProductRow>,
}

/// Product row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    /// Product identifier.
    pub id: i64,
    /// Name.
    pub nombre: String,
    /// Brand name or "Sin marca".
    pub marca: String,
    /// Category name or "Sin categoría".
    pub categoria: String,
    /// List price.
    pub precio: f64,
    /// Units in stock.
    pub stock: i32,
}

/// Customers dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomersReportData {
    /// Customer count.
    pub total_clientes: usize,
    /// Customer rows.
    pub clientes: Vec<CustomerRow>,
}

/// Customer row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    /// User identifier.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Paid purchases.
    pub cantidad_compras: i64,
    /// Lifetime paid spend.
    pub total_compras: f64,
    /// Registration date `dd/mm/YYYY`.
    pub fecha_registro: String,
}

/// Inventory dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReportData {
    /// Listed product count.
    pub total_productos: usize,
    /// Products with fewer than ten units.
    pub productos_bajo_stock: usize,
    /// Products with no units.
    pub productos_sin_stock: usize,
    /// Sum of price times stock.
    pub valor_total_inventario: f64,
    /// Low-stock rows.
    pub productos_bajo_stock_detalle: Vec<LowStockRow>,
}

/// Low-stock product row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockRow {
    /// Name.
    pub nombre: String,
    /// Units in stock.
    pub stock: i32,
    /// List price.
    pub precio: f64,
}

/// Financial dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReportData {
    /// Sum of paid totals in range.
    pub ingresos_totales: f64,
    /// Paid transaction count.
    pub cantidad_transacciones: usize,
    /// Average ticket.
    pub ticket_promedio: f64,
    /// Requested range.
    pub periodo: ReportPeriod,
}

/// Requested range as ISO dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    /// Inclusive start.
    pub fecha_inicio: Option<String>,
    /// Inclusive end.
    pub fecha_fin: Option<String>,
}

pub(crate) fn money(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or_default()
}

fn status_label(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
