use std::sync::Arc;

use ipnet::IpNet;
use smartsales_application::{
    AuditRecorder, CartService, CatalogService, DiscountService, ForecastService,
    MaintenanceService, ReportService, SaleService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub cart_service: CartService,
    pub sale_service: SaleService,
    pub discount_service: DiscountService,
    pub maintenance_service: MaintenanceService,
    pub report_service: ReportService,
    pub forecast_service: ForecastService,
    pub audit_recorder: AuditRecorder,
    pub trusted_proxies: Arc<[IpNet]>,
}
