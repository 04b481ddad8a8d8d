use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use smartsales_core::{ActorContext, AppError, AppResult};
use smartsales_domain::{Sale, SaleLineRequest, SaleStatus, Warranty};
use tracing::{info, warn};

use crate::{
    AuditRecorder, DocumentStore, PaymentGateway, PaymentIntent, RegisterSaleInput,
    SaleNoteRenderer, SaleQuery, SaleRepository,
};


const DEFAULT_PURCHASE_LIMIT: usize = 20;
const TOP_PRODUCTS: usize = 10;
const PAYMENT_CURRENCY: &str = "usd";

/// Window used by sales statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsPeriod {
    /// Today only.
    Hoy,
    /// Last seven days.
    Semana,
    /// Last thirty days.
    #[default]
    Mes,
    /// Last 365 days.
    Anio,
}

impl StatsPeriod {
    /// Returns the stable query value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hoy => "hoy",
            Self::Semana => "semana",
            Self::Mes => "mes",
            Self::Anio => "año",
        }
    }

    fn starts_on(self, today: NaiveDate) -> NaiveDate {
        let days = match self {
            Self::Hoy => 0,
            Self::Semana => 7,
            Self::Mes => 30,
            Self::Anio => 365,
        };
        today.checked_sub_days(Days::new(days)).unwrap_or(today)
    }
}

impl FromStr for StatsPeriod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "hoy" => Ok(Self::Hoy),
            "semana" => Ok(Self::Semana),
            "mes" => Ok(Self::Mes),
            "año" | "anio" => Ok(Self::Anio),
            other => Err(AppError::Validation(format!("periodo no soportado '{other}'"))),
        }
    }
}

/// Sales history filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleHistoryFilter {
    /// Restrict to one status.
    pub status: Option<SaleStatus>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    /// Restrict to one customer; administrators only.
    pub customer_id: Option<i64>,
}

/// Caller's purchases with spending totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseSummary {
    /// Sum of listed-status purchase totals.
    pub total_spent: Decimal,
    /// Number of purchases.
    pub purchases: usize,
    /// Average ticket.
    pub average_ticket: Decimal,
    /// Most recent purchases.
    pub sales: Vec<Sale>,
}

/// Units and revenue of one product within a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSalesRank {
    /// Product identifier.
    pub product_id: i64,
    /// Product name.
    pub product_name: String,
    /// Units sold.
    pub units: i64,
    /// Revenue from those units.
    pub revenue: Decimal,
}

/// Sales of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySales {
    /// Day.
    pub day: NaiveDate,
    /// Number of sales.
    pub sales: usize,
    /// Revenue.
    pub total: Decimal,
}

/// Aggregate sales statistics for a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesStatistics {
    /// Requested period.
    pub period: StatsPeriod,
    /// First day covered.
    pub starts_on: NaiveDate,
    /// Last day covered.
    pub ends_on: NaiveDate,
    /// Revenue of non-cancelled sales.
    pub total_revenue: Decimal,
    /// Count of non-cancelled sales.
    pub sales_count: usize,
    /// Average ticket.
    pub average_ticket: Decimal,
    /// Best sellers by units.
    pub top_products: Vec<ProductSalesRank>,
    /// Per-day buckets, oldest first.
    pub daily: Vec<DailySales>,
}

/// Application service for checkout, sales history and cancellations.
#[derive(Clone)]
pub struct SaleService {
    sales: Arc<dyn SaleRepository>,
    payments: Option<Arc<dyn PaymentGateway>>,
    notes: Arc<dyn SaleNoteRenderer>,
    documents: Arc<dyn DocumentStore>,
    audit: AuditRecorder,
}

impl SaleService {
    /// Creates a new sale service.
    #[must_use]
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        payments: Option<Arc<dyn PaymentGateway>>,
        notes: Arc<dyn SaleNoteRenderer>,
        documents: Arc<dyn DocumentStore>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            sales,
            payments,
            notes,
            documents,
            audit,
        }
    }

    /// Creates a card payment intent for `amount` dollars.
    pub async fn create_payment_intent(
        &self,
        actor: &ActorContext,
        amount: Decimal,
    ) -> AppResult<PaymentIntent> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("el monto debe ser mayor a cero".to_owned()));
        }
        let gateway = self.payments.as_ref().ok_or_else(|| {
            AppError::Internal("payment gateway is not configured".to_owned())
        })?;
        let cents = (amount * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .ok_or_else(|| AppError::Validation("monto fuera de rango".to_owned()))?;

        let intent = gateway.create_payment_intent(cents, PAYMENT_CURRENCY).await?;
        info!(user_id = actor.user_id(), amount_cents = cents, "payment intent created");
        Ok(intent)
    }

    /// Registers a paid sale for the caller and stores its sale note.
    pub async fn register_sale(
        &self,
        actor: &ActorContext,
        lines: Vec<SaleLineRequest>,
        total: Decimal,
    ) -> AppResult<Sale> {
        if lines.is_empty() {
            return Err(AppError::Validation(
                "la venta debe incluir al menos un producto".to_owned(),
            ));
        }
        if let Some(line) = lines.iter().find(|line| line.quantity <= 0) {
            return Err(AppError::Validation(format!(
                "cantidad inválida para el producto {}",
                line.product_id
            )));
        }
        if total <= Decimal::ZERO {
            return Err(AppError::Validation("el total debe ser mayor a cero".to_owned()));
        }

        let input = RegisterSaleInput {
            customer_id: actor.user_id(),
            lines,
            total,
            registered_on: Utc::now().date_naive(),
        };
        let sale = self
            .audit
            .audited(
                actor,
                "Registrar venta",
                self.sales.register_sale(input),
                |sale: &Sale| {
                    format!(
                        "Registró venta #{} por un total de {} USD",
                        sale.id,
                        sale.total.round_dp(2)
                    )
                },
            )
            .await?;

        self.store_sale_note(&sale).await;
        Ok(sale)
    }

    /// Lists sales newest first; administrators see every sale.
    pub async fn list_sales(&self, actor: &ActorContext) -> AppResult<Vec<Sale>> {
        self.sales
            .list_sales(SaleQuery {
                customer_id: (!actor.is_admin()).then_some(actor.user_id()),
                ..SaleQuery::default()
            })
            .await
    }

    /// Returns one sale visible to the caller.
    pub async fn get_sale(&self, actor: &ActorContext, sale_id: i64) -> AppResult<Sale> {
        let sale = self
            .sales
            .find_sale(sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("venta {sale_id} no encontrada")))?;
        actor.require_owner_or_admin(sale.customer_id)?;
        Ok(sale)
    }

    /// Changes a sale's status; cancellation restores stock.
    pub async fn update_status(
        &self,
        actor: &ActorContext,
        sale_id: i64,
        status: SaleStatus,
    ) -> AppResult<Sale> {
        if status == SaleStatus::Cancelado {
            return self.cancel_sale(actor, sale_id).await;
        }

        let sale = self.get_sale(actor, sale_id).await?;
        if sale.status == SaleStatus::Cancelado {
            return Err(AppError::Conflict(format!(
                "la venta #{sale_id} está cancelada y no puede modificarse"
            )));
        }

        self.audit
            .audited(
                actor,
                &format!("Actualizar venta #{sale_id}"),
                self.sales.update_status(sale_id, status),
                |sale: &Sale| format!("Actualizó venta #{} a estado {}", sale.id, sale.status),
            )
            .await
    }

    /// Cancels a sale once, returning its units to stock.
    pub async fn cancel_sale(&self, actor: &ActorContext, sale_id: i64) -> AppResult<Sale> {
        let sale = self.get_sale(actor, sale_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Cancelar venta #{sale_id}"),
                async {
                    sale.ensure_cancellable()?;
                    self.sales.cancel_sale(sale_id).await
                },
                |sale: &Sale| {
                    format!(
                        "Canceló venta #{} por un total de {} USD",
                        sale.id,
                        sale.total.round_dp(2)
                    )
                },
            )
            .await
    }

    /// Lists warranties issued for a sale.
    pub async fn warranties(&self, actor: &ActorContext, sale_id: i64) -> AppResult<Vec<Warranty>> {
        self.get_sale(actor, sale_id).await?;
        self.sales.list_warranties(sale_id).await
    }

    /// Filtered sales history; non-administrators only see their own sales.
    pub async fn history(
        &self,
        actor: &ActorContext,
        filter: SaleHistoryFilter,
    ) -> AppResult<Vec<Sale>> {
        validate_range(filter.from, filter.to)?;
        let customer_id = if actor.is_admin() {
            filter.customer_id
        } else {
            if filter.customer_id.is_some_and(|id| id != actor.user_id()) {
                return Err(AppError::Forbidden(
                    "solo un administrador puede filtrar por usuario".to_owned(),
                ));
            }
            Some(actor.user_id())
        };

        self.sales
            .list_sales(SaleQuery {
                customer_id,
                status: filter.status,
                from: filter.from,
                to: filter.to,
                limit: None,
            })
            .await
    }

    /// Caller's purchases with spending summary.
    pub async fn my_purchases(
        &self,
        actor: &ActorContext,
        status: Option<SaleStatus>,
        limit: Option<usize>,
    ) -> AppResult<PurchaseSummary> {
        let sales = self
            .sales
            .list_sales(SaleQuery {
                customer_id: Some(actor.user_id()),
                status,
                ..SaleQuery::default()
            })
            .await?;

        let total_spent: Decimal = sales.iter().map(|sale| sale.total).sum();
        let purchases = sales.len();
        Ok(PurchaseSummary {
            total_spent,
            purchases,
            average_ticket: average(total_spent, purchases),
            sales: sales
                .into_iter()
                .take(limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_PURCHASE_LIMIT))
                .collect(),
        })
    }

    /// Aggregate statistics over non-cancelled sales in `period`.
    pub async fn statistics(
        &self,
        actor: &ActorContext,
        period: StatsPeriod,
    ) -> AppResult<SalesStatistics> {
        actor.require_admin()?;
        let ends_on = Utc::now().date_naive();
        let starts_on = period.starts_on(ends_on);

        let sales = self
            .sales
            .list_sales(SaleQuery {
                from: Some(starts_on),
                to: Some(ends_on),
                ..SaleQuery::default()
            })
            .await?
            .into_iter()
            .filter(|sale| sale.status != SaleStatus::Cancelado)
            .collect::<Vec<_>>();

        let statistics = summarize(period, starts_on, ends_on, &sales);
        self.audit
            .record(
                actor,
                format!("Consultó estadísticas de ventas ({})", period.as_str()),
                true,
            )
            .await;
        Ok(statistics)
    }

    /// Sales inside an explicit inclusive range.
    pub async fn by_period(
        &self,
        actor: &ActorContext,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(AppError::Validation(
                "fecha_inicio y fecha_fin son requeridas".to_owned(),
            ));
        };

        self.history(
            actor,
            SaleHistoryFilter {
                from: Some(from),
                to: Some(to),
                ..SaleHistoryFilter::default()
            },
        )
        .await
    }

    async fn store_sale_note(&self, sale: &Sale) {
        let bytes = match self.notes.render_sale_note(sale) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(sale_id = sale.id, error = %error, "failed to render sale note");
                return;
            }
        };

        if let Err(error) = self.documents.save(&sale_note_key(sale.id), &bytes).await {
            warn!(sale_id = sale.id, error = %error, "failed to store sale note");
        }
    }
}

/// Storage key of the sale note rendered for `sale_id`.
#[must_use]
pub fn sale_note_key(sale_id: i64) -> String {
    format!("notas/nota_venta_{sale_id}.pdf")
}

fn validate_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(AppError::Validation(
                "la fecha de fin no puede ser anterior a la fecha de inicio".to_owned(),
            ));
        }
    }
    Ok(())
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn summarize(
    period: StatsPeriod,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    sales: &[Sale],
) -> SalesStatistics {
    let total_revenue: Decimal = sales.iter().map(|sale| sale.total).sum();

    let mut products = BTreeMap::<i64, ProductSalesRank>::new();
    let mut daily = BTreeMap::<NaiveDate, DailySales>::new();
    for sale in sales {
        for line in &sale.lines {
            let rank = products
                .entry(line.product_id)
                .or_insert_with(|| ProductSalesRank {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    units: 0,
                    revenue: Decimal::ZERO,
                });
            rank.units += i64::from(line.quantity);
            rank.revenue += line.subtotal;
        }

        let day = sale.created_at.date_naive();
        let bucket = daily.entry(day).or_insert_with(|| DailySales {
            day,
            sales: 0,
            total: Decimal::ZERO,
        });
        bucket.sales += 1;
        bucket.total += sale.total;
    }

    let mut top_products = products.into_values().collect::<Vec<_>>();
    top_products.sort_by(|left, right| {
        right
            .units
            .cmp(&left.units)
            .then_with(|| left.product_name.cmp(&right.product_name))
    });
    top_products.truncate(TOP_PRODUCTS);

    SalesStatistics {
        period,
        starts_on,
        ends_on,
        total_revenue,
        sales_count: sales.len(),
        average_ticket: average(total_revenue, sales.len()),
        top_products,
        daily: daily.into_values().collect(),
    }
}
