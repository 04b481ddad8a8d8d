mod audit;
mod carts;
mod catalog;
mod common;
mod discounts;
mod forecast;
mod maintenance;
mod reports;
mod sales;
mod users;

pub use audit::AuditEntryResponse;
pub use carts::{AddToCartRequest, CartResponse};
pub use catalog::{
    BrandResponse, CategoryResponse, NamedResourceRequest, ProductDiscountRequest,
    ProductRequest, ProductResponse,
};
pub use common::{HealthResponse, MessageResponse};
pub use discounts::{DiscountRequest, DiscountResponse, ProductPriceQuoteResponse};
pub use forecast::{ForecastOverviewResponse, ForecastPointResponse, MonthlySalesResponse};
pub use maintenance::{
    AssignTechnicianRequest, CreateMaintenanceRequest, MaintenanceResponse,
    UpdateMaintenanceStatusRequest,
};
pub use reports::{
    GenerateReportRequest, GeneratedReportResponse, PromptPreviewResponse, PromptRequest,
    ReportHistoryResponse, ReportResponse, StructuredReportResponse, VoiceTextRequest,
};
pub use sales::{
    PaymentIntentRequest, PaymentIntentResponse, PurchaseSummaryResponse, RegisterSaleRequest,
    RegisteredSaleResponse, SaleResponse, SalesStatisticsResponse, UpdateSaleStatusRequest,
    WarrantyResponse,
};
pub use users::{
    ChangeRoleRequest, CreateUserRequest, CreatedUserResponse, RoleResponse, UserResponse,
};
