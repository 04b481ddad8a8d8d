//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod audit_recorder;
mod cart_ports;
mod cart_service;
mod catalog_ports;
mod catalog_service;
mod discount_ports;
mod discount_service;
mod forecast_ports;
mod forecast_service;
mod maintenance_ports;
mod maintenance_service;
mod report_ports;
mod report_service;
mod sale_ports;
mod sale_service;
mod user_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditLogQuery, AuditRepository, NewAuditEntry};
pub use audit_recorder::AuditRecorder;
pub use cart_ports::CartRepository;
pub use cart_service::CartService;
pub use catalog_ports::{CatalogRepository, ProductOrdering, ProductQuery};
pub use catalog_service::CatalogService;
pub use discount_ports::DiscountRepository;
pub use discount_service::{DiscountService, ProductPriceQuote};
pub use forecast_ports::ForecastModelCache;
pub use forecast_service::{DEFAULT_FORECAST_MONTHS, ForecastOverview, ForecastService};
pub use maintenance_ports::{MaintenanceQuery, MaintenanceRepository, NewMaintenanceTicket};
pub use maintenance_service::{MaintenanceProgress, MaintenanceRequest, MaintenanceService};
pub use report_ports::{
    AiReportHints, AudioClip, CustomerPurchaseSummary, DocumentStore, NewReport,
    PromptInterpreter, RenderedReport, ReportDataSource, ReportQuery, ReportRenderer,
    ReportRepository, SpeechTranscriber,
};
pub use report_service::{
    ChartSeries, CustomerRow, CustomersReportData, FinancialReportData, GeneratedReport,
    InventoryReportData, LOW_STOCK_THRESHOLD, LowStockRow, ParsedPrompt, ProductRow,
    ProductsReportData, ProjectedSaleRow, PromptPreview, ReportAssembler, ReportDataset,
    ReportDownload, ReportPeriod, ReportService, SALES_DETAIL_LIMIT, SaleSummaryRow, SalesBucket,
    SalesDetail, SalesReportData, VoiceReport, parse_prompt, report_file_name,
};
pub use sale_ports::{
    PaymentGateway, PaymentIntent, RegisterSaleInput, SaleNoteRenderer, SaleQuery,
    SaleRepository,
};
pub use sale_service::{
    DailySales, ProductSalesRank, PurchaseSummary, SaleHistoryFilter, SaleService,
    SalesStatistics, StatsPeriod, sale_note_key,
};
pub use user_ports::{NewUserAccount, UserRepository};
pub use user_service::{CreateUserInput, IssuedUser, RoleDescriptor, UserService};
