use async_trait::async_trait;
use smartsales_core::AppResult;
use smartsales_domain::{MaintenanceKind, MaintenanceTicket};

/// Input for ticket creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMaintenanceTicket {
    /// Product under maintenance.
    pub product_id: i64,
    /// Requesting customer.
    pub customer_id: i64,
    /// Originating sale.
    pub sale_id: i64,
    /// Kind of work.
    pub kind: MaintenanceKind,
    /// Problem description.
    pub description: String,
    /// Whether a current warranty covers the work.
    pub covered_by_warranty: bool,
}

/// Ticket listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceQuery {
    /// Restrict to one customer.
    pub customer_id: Option<i64>,
    /// Restrict to one technician.
    pub technician_id: Option<i64>,
}

/// Repository port for maintenance tickets.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Creates a pending ticket.
    async fn create_ticket(&self, input: NewMaintenanceTicket) -> AppResult<MaintenanceTicket>;

    /// Finds a ticket.
    async fn find_ticket(&self, ticket_id: i64) -> AppResult<Option<MaintenanceTicket>>;

    /// Lists tickets newest first.
    async fn list_tickets(&self, query: MaintenanceQuery) -> AppResult<Vec<MaintenanceTicket>>;

    /// Persists technician, status, completion, cost and notes of a ticket.
    async fn save_ticket(&self, ticket: &MaintenanceTicket) -> AppResult<MaintenanceTicket>;

    /// Deletes a ticket.
    async fn delete_ticket(&self, ticket_id: i64) -> AppResult<()>;

    /// Whether a pending or in-progress ticket exists for the product of a sale.
    async fn has_open_ticket(&self, product_id: i64, sale_id: i64) -> AppResult<bool>;
}
