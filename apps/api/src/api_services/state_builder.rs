use std::sync::Arc;

use smartsales_application::{
    AuditRecorder, CartService, CatalogService, DiscountService, ForecastService,
    MaintenanceService, PaymentGateway, PromptInterpreter, ReportService, SaleService,
    SpeechTranscriber, UserService,
};
use smartsales_core::AppError;
use smartsales_infrastructure::{
    DocumentRenderer, FilesystemDocumentStore, GeminiPromptInterpreter, HttpSpeechTranscriber,
    InMemoryForecastModelCache, PostgresAuditRepository, PostgresCartRepository,
    PostgresCatalogRepository, PostgresDiscountRepository, PostgresMaintenanceRepository,
    PostgresReportDataSource, PostgresReportRepository, PostgresSaleRepository,
    PostgresUserRepository, StripePaymentGateway,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.ai_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let audit_recorder = AuditRecorder::new(Arc::new(PostgresAuditRepository::new(pool.clone())));
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let catalog_repository = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let sale_repository = Arc::new(PostgresSaleRepository::new(pool.clone()));
    let renderer = Arc::new(DocumentRenderer::new());
    let documents = Arc::new(FilesystemDocumentStore::new(config.media_root.clone()));

    let payments: Option<Arc<dyn PaymentGateway>> =
        config.stripe_secret_key.clone().map(|secret_key| {
            Arc::new(StripePaymentGateway::new(http_client.clone(), secret_key))
                as Arc<dyn PaymentGateway>
        });
    let interpreter: Option<Arc<dyn PromptInterpreter>> = config.gemini.clone().map(|gemini| {
        Arc::new(GeminiPromptInterpreter::new(
            http_client.clone(),
            gemini.api_key,
            gemini.model,
        )) as Arc<dyn PromptInterpreter>
    });
    let transcriber: Option<Arc<dyn SpeechTranscriber>> = config.speech.clone().map(|speech| {
        Arc::new(HttpSpeechTranscriber::new(
            http_client.clone(),
            speech.endpoint,
            speech.api_key,
        )) as Arc<dyn SpeechTranscriber>
    });
    info!(
        payments = payments.is_some(),
        prompt_ai = interpreter.is_some(),
        speech = transcriber.is_some(),
        "optional integrations configured"
    );

    Ok(AppState {
        user_service: UserService::new(user_repository.clone(), audit_recorder.clone()),
        catalog_service: CatalogService::new(catalog_repository.clone(), audit_recorder.clone()),
        cart_service: CartService::new(
            Arc::new(PostgresCartRepository::new(pool.clone())),
            catalog_repository.clone(),
            audit_recorder.clone(),
        ),
        sale_service: SaleService::new(
            sale_repository.clone(),
            payments,
            renderer.clone(),
            documents.clone(),
            audit_recorder.clone(),
        ),
        discount_service: DiscountService::new(
            Arc::new(PostgresDiscountRepository::new(pool.clone())),
            catalog_repository,
            audit_recorder.clone(),
        ),
        maintenance_service: MaintenanceService::new(
            Arc::new(PostgresMaintenanceRepository::new(pool.clone())),
            sale_repository.clone(),
            user_repository,
            audit_recorder.clone(),
        ),
        report_service: ReportService::new(
            Arc::new(PostgresReportRepository::new(pool.clone())),
            Arc::new(PostgresReportDataSource::new(pool)),
            renderer,
            documents,
            audit_recorder.clone(),
            interpreter,
            transcriber,
        ),
        forecast_service: ForecastService::new(
            sale_repository,
            Arc::new(InMemoryForecastModelCache::new()),
        ),
        audit_recorder,
        trusted_proxies: config.trusted_proxies.clone().into(),
    })
}
