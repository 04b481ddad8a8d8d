use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use smartsales_core::{AppError, AppResult, UserRole};
use smartsales_domain::{
    GroupBy, Product, Report, ReportField, ReportFormat, ReportParameters, ReportType, Sale,
};
use tokio::sync::Mutex;

use super::{ReportDataset, ReportService, SalesDetail, report_file_name};
use crate::test_support::{
    MemoryDocumentStore, RecordingAuditRepository, actor, date, paid_sale, product, recorder,
    timestamp,
};
use crate::{
    AiReportHints, AudioClip, CustomerPurchaseSummary, NewReport, PromptInterpreter,
    RenderedReport, ReportDataSource, ReportQuery, ReportRenderer, ReportRepository,
    SpeechTranscriber,
};

#[derive(Default)]
struct InMemoryReportRepository {
    reports: Mutex<Vec<Report>>,
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create_report(&self, input: NewReport) -> AppResult<Report> {
        let mut reports = self.reports.lock().await;
        let report = Report {
            id: i64::try_from(reports.len()).unwrap_or_default() + 1,
            report_type: input.report_type,
            format: input.format,
            generated_at: Utc::now(),
            requested_by: Some(input.requested_by),
            requested_by_username: None,
            file_path: Some(input.file_path),
            parameters: input.parameters,
            starts_on: input.starts_on,
            ends_on: input.ends_on,
            description: input.description,
        };
        reports.push(report.clone());
        Ok(report)
    }

    async fn find_report(&self, report_id: i64) -> AppResult<Option<Report>> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .find(|report| report.id == report_id)
            .cloned())
    }

    async fn list_reports(&self, query: ReportQuery) -> AppResult<Vec<Report>> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .filter(|report| {
                query
                    .requested_by
                    .is_none_or(|user_id| report.requested_by == Some(user_id))
            })
            .cloned()
            .collect())
    }

    async fn delete_report(&self, report_id: i64) -> AppResult<()> {
        self.reports
            .lock()
            .await
            .retain(|report| report.id != report_id);
        Ok(())
    }
}

#[derive(Default)]
struct StaticDataSource {
    sales: Vec<Sale>,
    products: Vec<Product>,
}

#[async_trait]
impl ReportDataSource for StaticDataSource {
    async fn paid_sales(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>> {
        Ok(self
            .sales
            .iter()
            .filter(|sale| {
                let day = sale.created_at.date_naive();
                from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to)
            })
            .cloned()
            .collect())
    }

    async fn active_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn customer_summaries(&self) -> AppResult<Vec<CustomerPurchaseSummary>> {
        Ok(Vec::new())
    }
}

struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(
        &self,
        dataset: &ReportDataset,
        parameters: &ReportParameters,
        generated_at: DateTime<Utc>,
    ) -> AppResult<RenderedReport> {
        let bytes = serde_json::to_vec(dataset)
            .map_err(|error| AppError::Internal(format!("render failed: {error}")))?;
        Ok(RenderedReport {
            bytes,
            file_name: report_file_name(parameters, generated_at),
            content_type: parameters.format.content_type(),
        })
    }
}

#[derive(Default)]
struct CountingInterpreter {
    calls: AtomicUsize,
}

#[async_trait]
impl PromptInterpreter for CountingInterpreter {
    async fn interpret(&self, _prompt: &str) -> Option<AiReportHints> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(AiReportHints {
            tipo: Some("inventario".to_owned()),
            formato: Some("json".to_owned()),
            ..AiReportHints::default()
        })
    }
}

struct FixedTranscriber(Option<String>);

#[async_trait]
impl SpeechTranscriber for FixedTranscriber {
    async fn transcribe(&self, _clip: AudioClip) -> AppResult<Option<String>> {
        Ok(self.0.clone())
    }
}

struct Harness {
    service: ReportService,
    repository: Arc<InMemoryReportRepository>,
    documents: Arc<MemoryDocumentStore>,
    audit: Arc<RecordingAuditRepository>,
    interpreter: Arc<CountingInterpreter>,
}

fn harness(data: StaticDataSource, transcript: Option<&str>) -> Harness {
    let repository = Arc::new(InMemoryReportRepository::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let interpreter = Arc::new(CountingInterpreter::default());
    let (recorder, audit) = recorder();

    let service = ReportService::new(
        repository.clone(),
        Arc::new(data),
        Arc::new(JsonRenderer),
        documents.clone(),
        recorder,
        Some(interpreter.clone()),
        Some(Arc::new(FixedTranscriber(transcript.map(ToOwned::to_owned)))),
    );

    Harness {
        service,
        repository,
        documents,
        audit,
        interpreter,
    }
}

fn september_sales() -> StaticDataSource {
    StaticDataSource {
        sales: vec![
            paid_sale(1, "ana", timestamp(2024, 9, 3, 10), &[("Lavadora", 1, 400)]),
            paid_sale(2, "ana", timestamp(2024, 9, 10, 12), &[("Cocina", 2, 150)]),
            paid_sale(3, "luis", timestamp(2024, 9, 20, 16), &[("Refrigerador", 1, 900)]),
        ],
        products: vec![product(1, "Lavadora", 400, 3), product(2, "Cocina", 150, 25)],
    }
}

fn structured(report_type: ReportType) -> ReportParameters {
    ReportParameters {
        report_type,
        format: ReportFormat::Json,
        starts_on: Some(date(2024, 9, 1)),
        ends_on: Some(date(2024, 9, 30)),
        group_by: None,
        fields: None,
        description: String::new(),
        include_charts: true,
    }
}

#[tokio::test]
async fn text_prompt_generates_stored_report_with_prompt_metadata() {
    let harness = harness(september_sales(), None);
    let customer = actor(7, UserRole::Cliente);

    let result = harness
        .service
        .generate_from_prompt(
            &customer,
            "Reporte de ventas de septiembre 2024 agrupado por día en JSON",
            false,
        )
        .await;

    let Ok(generated) = result else {
        panic!("report should be generated");
    };
    assert_eq!(generated.report.report_type, ReportType::Ventas);
    assert_eq!(generated.report.format, ReportFormat::Json);
    assert_eq!(generated.report.requested_by, Some(7));
    assert_eq!(
        generated.report.parameters["prompt_original"],
        "Reporte de ventas de septiembre 2024 agrupado por día en JSON"
    );
    assert_eq!(generated.report.parameters["es_voz"], false);
    assert_eq!(generated.parameters.group_by, Some(GroupBy::Dia));
    assert_eq!(harness.interpreter.calls.load(Ordering::SeqCst), 0);

    let Some(path) = generated.report.file_path.clone() else {
        panic!("report should reference its file");
    };
    assert!(path.starts_with("reportes/7_reporte_ventas_"));
    assert!(path.ends_with(".json"));
    let files = harness.documents.files.lock().await;
    let Some(bytes) = files.get(&path) else {
        panic!("rendered file should be stored");
    };
    let Ok(stored) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        panic!("stored dataset should be json");
    };
    assert_eq!(stored["cantidad_ventas"], 3);
    assert_eq!(stored["ventas_por_dia"]["2024-09-10"]["cantidad"], 1);
    assert_eq!(stored["ventas_por_dia"]["2024-09-10"]["total"], 300.0);

    let actions = harness.audit.actions().await;
    assert_eq!(actions.len(), 1);
    assert!(actions[0].starts_with("Generó reporte dinámico de ventas mediante prompt de texto: '"));
}

#[tokio::test]
async fn voice_prompt_marks_description_and_truncates_it() {
    let harness = harness(september_sales(), None);
    let prompt = "reporte de ventas de septiembre a octubre de 2024 agrupado por semana en excel \
                  mostrar cliente, monto y fecha";

    let result = harness
        .service
        .generate_from_prompt(&actor(7, UserRole::Cliente), prompt, true)
        .await;

    let Ok(generated) = result else {
        panic!("voice report should be generated");
    };
    assert!(generated.report.description.chars().count() <= 100);
    assert_eq!(generated.report.parameters["es_voz"], true);
    let actions = harness.audit.actions().await;
    assert!(actions[0].contains("mediante comando de voz"));
}

#[tokio::test]
async fn interpreter_is_consulted_only_when_type_or_format_is_missing() {
    let harness = harness(september_sales(), None);

    let preview = harness.service.preview("dame algo del último mes").await;
    let Ok(preview) = preview else {
        panic!("preview should succeed");
    };

    assert_eq!(harness.interpreter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(preview.parameters.report_type, ReportType::Inventario);
    assert_eq!(preview.parameters.format, ReportFormat::Json);
    assert!(preview.confirmation.starts_with("Se generará un reporte de inventario del "));
    assert!(preview.confirmation.ends_with("en formato JSON"));
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let harness = harness(september_sales(), None);

    let result = harness
        .service
        .generate_from_prompt(&actor(7, UserRole::Cliente), "   ", false)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness.repository.reports.lock().await.is_empty());
}

#[tokio::test]
async fn unintelligible_audio_is_a_validation_error() {
    let harness = harness(september_sales(), None);
    let clip = AudioClip {
        file_name: "nota.webm".to_owned(),
        content_type: "audio/webm".to_owned(),
        bytes: vec![1, 2, 3],
    };

    let result = harness
        .service
        .generate_from_audio(&actor(7, UserRole::Cliente), clip)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn audio_transcript_drives_generation() {
    let harness = harness(september_sales(), Some("inventario en pdf"));
    let clip = AudioClip {
        file_name: "nota.webm".to_owned(),
        content_type: "audio/webm".to_owned(),
        bytes: vec![1, 2, 3],
    };

    let result = harness
        .service
        .generate_from_audio(&actor(7, UserRole::Cliente), clip)
        .await;

    let Ok(voice) = result else {
        panic!("voice report should be generated");
    };
    assert_eq!(voice.transcript, "inventario en pdf");
    assert_eq!(voice.generated.report.report_type, ReportType::Inventario);
    assert!(voice.generated.report.description.ends_with("(comando de voz)"));
}

#[tokio::test]
async fn structured_request_rejects_inverted_range() {
    let harness = harness(september_sales(), None);
    let mut parameters = structured(ReportType::Financiero);
    parameters.ends_on = Some(date(2024, 8, 1));

    let result = harness
        .service
        .generate_structured(&actor(1, UserRole::Administrador), parameters)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn inventory_without_low_stock_products_still_generates() {
    let data = StaticDataSource {
        sales: Vec::new(),
        products: vec![product(1, "Televisor", 800, 40)],
    };
    let harness = harness(data, None);

    let result = harness
        .service
        .generate_structured(
            &actor(1, UserRole::Administrador),
            structured(ReportType::Inventario),
        )
        .await;

    let Ok(report) = result else {
        panic!("inventory report should be generated");
    };
    assert_eq!(
        harness.audit.actions().await,
        vec!["Generó reporte de inventario en formato json".to_owned()]
    );
    assert_eq!(report.description, "Reporte de inventario del 01/09/2024 al 30/09/2024 (JSON)");
}

#[tokio::test]
async fn history_is_scoped_to_owner_unless_admin() {
    let harness = harness(september_sales(), None);
    let owner = actor(7, UserRole::Cliente);
    let other = actor(8, UserRole::Cliente);
    let admin = actor(1, UserRole::Administrador);

    let created = harness
        .service
        .generate_structured(&owner, structured(ReportType::Ventas))
        .await;
    let Ok(report) = created else {
        panic!("report should be generated");
    };

    let own = harness.service.list_reports(&owner, ReportQuery::default()).await;
    let foreign = harness.service.list_reports(&other, ReportQuery::default()).await;
    let all = harness.service.list_reports(&admin, ReportQuery::default()).await;
    assert!(matches!(own, Ok(ref reports) if reports.len() == 1));
    assert!(matches!(foreign, Ok(ref reports) if reports.is_empty()));
    assert!(matches!(all, Ok(ref reports) if reports.len() == 1));

    let denied = harness.service.download(&other, report.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn download_and_delete_are_audited() {
    let harness = harness(september_sales(), None);
    let owner = actor(7, UserRole::Cliente);
    let created = harness
        .service
        .generate_structured(&owner, structured(ReportType::Productos))
        .await;
    let Ok(report) = created else {
        panic!("report should be generated");
    };

    let download = harness.service.download(&owner, report.id).await;
    let Ok(download) = download else {
        panic!("owner should download");
    };
    assert_eq!(download.content_type, "application/json");
    assert!(download.file_name.starts_with("7_reporte_productos_"));

    assert!(harness.service.delete_report(&owner, report.id).await.is_ok());
    assert!(harness.documents.files.lock().await.is_empty());
    assert!(harness.repository.reports.lock().await.is_empty());

    let actions = harness.audit.actions().await;
    assert_eq!(actions[1], format!("Descargó reporte ID {}", report.id));
    assert_eq!(actions[2], format!("Eliminó reporte ID {} (productos)", report.id));
}

#[tokio::test]
async fn reports_generated_in_the_same_second_keep_separate_files() {
    let harness = harness(september_sales(), None);
    let owner = actor(7, UserRole::Cliente);

    let first = harness
        .service
        .generate_structured(&owner, structured(ReportType::Ventas))
        .await;
    let second = harness
        .service
        .generate_structured(&owner, structured(ReportType::Ventas))
        .await;
    let (Ok(first), Ok(second)) = (first, second) else {
        panic!("both reports should be generated");
    };
    let (Some(first_path), Some(second_path)) = (first.file_path.clone(), second.file_path.clone())
    else {
        panic!("both reports should have a stored file");
    };
    assert_ne!(first_path, second_path);
    assert!(first_path.starts_with("reportes/7_reporte_ventas_"));
    assert!(first_path.ends_with(".json"));
    assert_eq!(harness.documents.files.lock().await.len(), 2);

    assert!(harness.service.delete_report(&owner, first.id).await.is_ok());
    assert!(harness.service.download(&owner, second.id).await.is_ok());
}

#[tokio::test]
async fn sales_detail_is_capped_and_projected() {
    let sales = (1..=60)
        .map(|id| paid_sale(id, "ana", timestamp(2024, 9, 15, 10), &[("Cocina", 1, 100)]))
        .collect();
    let assembler = super::ReportAssembler::new(Arc::new(StaticDataSource {
        sales,
        products: Vec::new(),
    }));
    let mut parameters = structured(ReportType::Ventas);
    parameters.fields = Some(vec![ReportField::NombreCliente, ReportField::MontoTotal]);

    let Ok(ReportDataset::Sales(data)) = assembler.assemble(&parameters).await else {
        panic!("sales dataset expected");
    };

    assert_eq!(data.cantidad_ventas, 60);
    assert_eq!(data.total_ventas, 6000.0);
    assert_eq!(data.ticket_promedio, 100.0);
    assert_eq!(data.ventas_detalle.len(), 50);
    let SalesDetail::Projected(rows) = &data.ventas_detalle else {
        panic!("detail should be projected");
    };
    assert_eq!(rows[0].cliente.as_deref(), Some("ana"));
    assert_eq!(rows[0].monto_total, Some(100.0));
    assert!(rows[0].fecha.is_none());
}

#[tokio::test]
async fn grouping_by_customer_accumulates_count_and_sum() {
    let assembler = super::ReportAssembler::new(Arc::new(september_sales()));
    let mut parameters = structured(ReportType::Ventas);
    parameters.group_by = Some(GroupBy::Cliente);

    let Ok(ReportDataset::Sales(data)) = assembler.assemble(&parameters).await else {
        panic!("sales dataset expected");
    };

    let Some(buckets) = data.groupings.get("ventas_por_cliente") else {
        panic!("customer buckets expected");
    };
    assert_eq!(buckets["ana"].cantidad, 2);
    assert_eq!(buckets["ana"].total, 700.0);
    assert_eq!(buckets["luis"].cantidad, 1);
}

#[tokio::test]
async fn unsupported_grouping_leaves_detail_untouched() {
    let assembler = super::ReportAssembler::new(Arc::new(september_sales()));
    let mut parameters = structured(ReportType::Ventas);
    parameters.group_by = Some(GroupBy::Marca);

    let Ok(ReportDataset::Sales(data)) = assembler.assemble(&parameters).await else {
        panic!("sales dataset expected");
    };

    assert!(data.groupings.is_empty());
    assert!(matches!(data.ventas_detalle, SalesDetail::Full(ref rows) if rows.len() == 3));
}
