//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod document_renderer;
mod filesystem_document_store;
mod gemini_prompt_interpreter;
mod http_speech_transcriber;
mod in_memory_forecast_model_cache;
mod postgres_audit_repository;
mod postgres_cart_repository;
mod postgres_catalog_repository;
mod postgres_discount_repository;
mod postgres_maintenance_repository;
mod postgres_report_repository;
mod postgres_sale_repository;
mod postgres_support;
mod postgres_user_repository;
mod stripe_payment_gateway;

pub use document_renderer::DocumentRenderer;
pub use filesystem_document_store::FilesystemDocumentStore;
pub use gemini_prompt_interpreter::GeminiPromptInterpreter;
pub use http_speech_transcriber::HttpSpeechTranscriber;
pub use in_memory_forecast_model_cache::InMemoryForecastModelCache;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_cart_repository::PostgresCartRepository;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_discount_repository::PostgresDiscountRepository;
pub use postgres_maintenance_repository::PostgresMaintenanceRepository;
pub use postgres_report_repository::{PostgresReportDataSource, PostgresReportRepository};
pub use postgres_sale_repository::PostgresSaleRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use stripe_payment_gateway::StripePaymentGateway;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
