use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use smartsales_core::AppResult;
use smartsales_domain::{MonthlySales, Sale, SaleLineRequest, SaleStatus, Warranty};

/// Input for atomic sale registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSaleInput {
    /// Buying customer.
    pub customer_id: i64,
    /// Requested lines.
    pub lines: Vec<SaleLineRequest>,
    /// Charged total.
    pub total: Decimal,
    /// Business date used for prices and warranties.
    pub registered_on: NaiveDate,
}

/// Sale listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleQuery {
    /// Restrict to one customer.
    pub customer_id: Option<i64>,
    /// Restrict to one status.
    pub status: Option<SaleStatus>,
    /// Inclusive first day.
    pub from: Option<NaiveDate>,
    /// Inclusive last day.
    pub to: Option<NaiveDate>,
    /// Maximum rows, newest first.
    pub limit: Option<usize>,
}

/// Repository port for sales, their lines and warranties.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Creates a paid sale with lines and warranties and decrements stock.
    ///
    /// All effects commit together; a missing product or insufficient stock
    /// on any line leaves no trace.
    async fn register_sale(&self, input: RegisterSaleInput) -> AppResult<Sale>;

    /// Marks a sale cancelled and restores the stock of every line exactly once.
    async fn cancel_sale(&self, sale_id: i64) -> AppResult<Sale>;

    /// Finds a sale with its lines.
    async fn find_sale(&self, sale_id: i64) -> AppResult<Option<Sale>>;

    /// Lists sales newest first.
    async fn list_sales(&self, query: SaleQuery) -> AppResult<Vec<Sale>>;

    /// Changes the status of a sale without touching stock.
    ///
    /// A sale that is already cancelled is left untouched and reported as
    /// [`smartsales_core::AppError::Conflict`], even if the cancellation
    /// committed after the caller last read it.
    async fn update_status(&self, sale_id: i64, status: SaleStatus) -> AppResult<Sale>;

    /// Lists warranties generated by a sale.
    async fn list_warranties(&self, sale_id: i64) -> AppResult<Vec<Warranty>>;

    /// Monthly totals of non-cancelled sales, oldest first.
    async fn monthly_totals(&self) -> AppResult<Vec<MonthlySales>>;
}

/// Payment intent created with the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Provider identifier.
    pub id: String,
    /// Secret handed to the client to confirm the payment.
    pub client_secret: String,
}

/// Port for the external payment-intent API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a card payment intent for `amount_cents`.
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> AppResult<PaymentIntent>;
}

/// Renders the customer-facing sale note.
pub trait SaleNoteRenderer: Send + Sync {
    /// Produces the PDF bytes of the sale note.
    fn render_sale_note(&self, sale: &Sale) -> AppResult<Vec<u8>>;
}
