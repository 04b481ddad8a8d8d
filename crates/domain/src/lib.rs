//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod cart;
mod catalog;
mod discount;
mod forecast;
mod maintenance;
mod report;
mod sale;
mod user;

pub use audit::AuditEntry;
pub use cart::{Cart, CartLine};
pub use catalog::{
    Brand, Category, Product, ProductDiscount, ProductDraft, apply_percentage_discount,
};
pub use discount::{Discount, DiscountDraft};
pub use forecast::{MonthlyForecast, MonthlySales, SalesForecastModel, YearMonth};
pub use maintenance::{MaintenanceKind, MaintenanceStatus, MaintenanceTicket};
pub use report::{GroupBy, Report, ReportField, ReportFormat, ReportParameters, ReportType};
pub use sale::{
    Sale, SaleLine, SaleLineRequest, SaleStatus, Warranty, WarrantyStatus, warranty_end_date,
};
pub use user::UserAccount;
