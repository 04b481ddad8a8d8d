use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;
use smartsales_core::AppResult;
use smartsales_domain::{GroupBy, Product, ReportField, ReportParameters, ReportType};
use tracing::warn;

use crate::ReportDataSource;

use super::dataset::{
    CustomerRow, CustomersReportData, FinancialReportData, InventoryReportData, LowStockRow,
    ProductRow, ProductsReportData, ProjectedSaleRow, ReportDataset, ReportPeriod, SaleSummaryRow,
    SalesBucket, SalesDetail, SalesReportData, money,
};

/// Most recent sales listed in the detail section.
pub const SALES_DETAIL_LIMIT: usize = 50;

/// Units below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Builds per-type datasets from the read-side data source.
#[derive(Clone)]
pub struct ReportAssembler {
    data_source: Arc<dyn ReportDataSource>,
}

impl ReportAssembler {
    /// Creates a new assembler.
    #[must_use]
    pub fn new(data_source: Arc<dyn ReportDataSource>) -> Self {
        Self { data_source }
    }

    /// Assembles the dataset for `parameters`, applying grouping then projection.
    pub async fn assemble(&self, parameters: &ReportParameters) -> AppResult<ReportDataset> {
        match parameters.report_type {
            ReportType::Ventas => {
                let mut data = self.sales(parameters).await?;
                if let Some(group_by) = parameters.group_by {
                    apply_grouping(&mut data, group_by);
                }
                if let Some(fields) = parameters.fields.as_deref() {
                    apply_field_projection(&mut data, fields);
                }
                Ok(ReportDataset::Sales(data))
            }
            ReportType::Productos => {
                let products = self.data_source.active_products().await?;
                Ok(ReportDataset::Products(products_data(&products)))
            }
            ReportType::Clientes => self.customers().await.map(ReportDataset::Customers),
            ReportType::Inventario => {
                let products = self.data_source.active_products().await?;
                Ok(ReportDataset::Inventory(inventory_data(&products)))
            }
            ReportType::Financiero => self.financial(parameters).await.map(ReportDataset::Financial),
        }
    }

    async fn sales(&self, parameters: &ReportParameters) -> AppResult<SalesReportData> {
        let sales = self
            .data_source
            .paid_sales(parameters.starts_on, parameters.ends_on)
            .await?;

        let total: Decimal = sales.iter().map(|sale| sale.total).sum();
        let count = sales.len();
        let units = sales.iter().map(|sale| sale.units()).sum();

        let mut monthly = BTreeMap::<(i32, u32), Decimal>::new();
        for sale in &sales {
            let date = sale.created_at.date_naive();
            *monthly
                .entry((date.year(), date.month()))
                .or_default() += sale.total;
        }

        Ok(SalesReportData {
            total_ventas: money(total),
            cantidad_ventas: count,
            ticket_promedio: average(total, count),
            productos_vendidos: units,
            ventas_detalle: SalesDetail::Full(
                sales
                    .iter()
                    .take(SALES_DETAIL_LIMIT)
                    .map(SaleSummaryRow::from_sale)
                    .collect(),
            ),
            groupings: BTreeMap::new(),
            monthly_totals: monthly
                .into_iter()
                .map(|((year, month), total)| (format!("{month:02}/{year}"), money(total)))
                .collect(),
        })
    }

    async fn customers(&self) -> AppResult<CustomersReportData> {
        let summaries = self.data_source.customer_summaries().await?;

        Ok(CustomersReportData {
            total_clientes: summaries.len(),
            clientes: summaries
                .into_iter()
                .map(|summary| CustomerRow {
                    id: summary.user_id,
                    username: summary.username,
                    email: summary.email,
                    cantidad_compras: summary.purchases,
                    total_compras: money(summary.total_spent),
                    fecha_registro: summary.joined_at.format("%d/%m/%Y").to_string(),
                })
                .collect(),
        })
    }

    async fn financial(&self, parameters: &ReportParameters) -> AppResult<FinancialReportData> {
        let sales = self
            .data_source
            .paid_sales(parameters.starts_on, parameters.ends_on)
            .await?;
        let total: Decimal = sales.iter().map(|sale| sale.total).sum();

        Ok(FinancialReportData {
            ingresos_totales: money(total),
            cantidad_transacciones: sales.len(),
            ticket_promedio: average(total, sales.len()),
            periodo: ReportPeriod {
                fecha_inicio: parameters.starts_on.map(|date| date.to_string()),
                fecha_fin: parameters.ends_on.map(|date| date.to_string()),
            },
        })
    }
}

fn products_data(products: &[Product]) -> ProductsReportData {
    ProductsReportData {
        total_productos: products.len(),
        valor_inventario: money(products.iter().map(Product::inventory_value).sum()),
        productos: products
            .iter()
            .map(|product| ProductRow {
                id: product.id,
                nombre: product.name.clone(),
                marca: product.brand_name().to_owned(),
                categoria: product.category_name().to_owned(),
                precio: money(product.price),
                stock: product.stock,
            })
            .collect(),
    }
}

fn inventory_data(products: &[Product]) -> InventoryReportData {
    let low_stock = products
        .iter()
        .filter(|product| product.stock < LOW_STOCK_THRESHOLD)
        .collect::<Vec<_>>();

    InventoryReportData {
        total_productos: products.len(),
        productos_bajo_stock: low_stock.len(),
        productos_sin_stock: products.iter().filter(|product| product.stock <= 0).count(),
        valor_total_inventario: money(products.iter().map(Product::inventory_value).sum()),
        productos_bajo_stock_detalle: low_stock
            .into_iter()
            .map(|product| LowStockRow {
                nombre: product.name.clone(),
                stock: product.stock,
                precio: money(product.price),
            })
            .collect(),
    }
}

fn average(total: Decimal, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    money(total / Decimal::from(count))
}

/// Re-buckets detail rows under `ventas_por_{criterio}`.
pub(crate) fn apply_grouping(data: &mut SalesReportData, group_by: GroupBy) {
    let SalesDetail::Full(rows) = &data.ventas_detalle else {
        return;
    };

    let key_of: fn(&SaleSummaryRow) -> String = match group_by {
        GroupBy::Cliente => |row| row.usuario.clone(),
        GroupBy::Dia => |row| row.created_at.format("%Y-%m-%d").to_string(),
        GroupBy::Semana => |row| row.created_at.format("%G-W%V").to_string(),
        GroupBy::Mes => |row| row.created_at.format("%Y-%m").to_string(),
        GroupBy::Anio => |row| row.created_at.format("%Y").to_string(),
        GroupBy::Producto | GroupBy::Categoria | GroupBy::Marca => {
            warn!(group_by = %group_by, "grouping not supported for sales detail");
            return;
        }
    };

    let mut buckets = BTreeMap::<String, SalesBucket>::new();
    for row in rows {
        let bucket = buckets.entry(key_of(row)).or_insert_with(|| SalesBucket {
            total: 0.0,
            cantidad: 0,
            ventas: Vec::new(),
        });
        bucket.cantidad += 1;
        bucket.total += row.total;
        bucket.ventas.push(row.clone());
    }
    for bucket in buckets.values_mut() {
        bucket.total = (bucket.total * 100.0).round() / 100.0;
    }

    data.groupings
        .insert(format!("ventas_por_{}", group_by.as_str()), buckets);
}

/// Replaces detail rows with their projection onto `fields`.
pub(crate) fn apply_field_projection(data: &mut SalesReportData, fields: &[ReportField]) {
    let SalesDetail::Full(rows) = &data.ventas_detalle else {
        return;
    };
    if fields.is_empty() {
        return;
    }

    let projected = rows
        .iter()
        .map(|row| {
            let mut projection = ProjectedSaleRow::default();
            for field in fields {
                match field {
                    ReportField::NombreCliente => projection.cliente = Some(row.usuario.clone()),
                    ReportField::CantidadCompras => projection.cantidad_compras = Some(1),
                    ReportField::MontoTotal => projection.monto_total = Some(row.total),
                    ReportField::Fechas => projection.fecha = Some(row.fecha.clone()),
                    ReportField::Producto => projection.producto = Some(row.producto.clone()),
                }
            }
            projection
        })
        .collect();

    data.ventas_detalle = SalesDetail::Projected(projected);
}
