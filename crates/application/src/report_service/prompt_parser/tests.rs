use chrono::NaiveDate;
use proptest::prelude::*;
use smartsales_domain::{GroupBy, ReportField, ReportFormat, ReportType};

use super::{month_bounds, parse_prompt};
use crate::AiReportHints;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        panic!("invalid test date {year}-{month}-{day}");
    };
    date
}

fn today() -> NaiveDate {
    date(2024, 10, 15)
}

#[test]
fn month_range_with_year_and_grouping_is_fully_detected() {
    let parsed = parse_prompt(
        "Quiero un reporte de ventas de septiembre a octubre de 2024 agrupado por semana en PDF",
        today(),
    );

    assert_eq!(parsed.report_type, Some(ReportType::Ventas));
    assert_eq!(parsed.format, Some(ReportFormat::Pdf));
    assert_eq!(parsed.starts_on, Some(date(2024, 9, 1)));
    assert_eq!(parsed.ends_on, Some(date(2024, 10, 31)));
    assert_eq!(parsed.group_by, Some(GroupBy::Semana));
    assert!(!parsed.needs_ai());
}

#[test]
fn inverted_month_range_covers_whole_months() {
    let parsed = parse_prompt("ventas de noviembre a febrero en excel", date(2024, 6, 15));
    let parameters = parsed.into_parameters(date(2024, 6, 15));

    assert_eq!(parameters.starts_on, Some(date(2024, 2, 1)));
    assert_eq!(parameters.ends_on, Some(date(2024, 11, 30)));
    assert_eq!(parameters.format, ReportFormat::Excel);
}

#[test]
fn single_month_uses_explicit_year() {
    let parsed = parse_prompt("reporte de clientes de febrero 2024 en excel", today());

    assert_eq!(parsed.report_type, Some(ReportType::Clientes));
    assert_eq!(parsed.format, Some(ReportFormat::Excel));
    assert_eq!(parsed.starts_on, Some(date(2024, 2, 1)));
    assert_eq!(parsed.ends_on, Some(date(2024, 2, 29)));
}

#[test]
fn setiembre_is_accepted_as_september() {
    let parsed = parse_prompt("inventario de setiembre", today());

    assert_eq!(parsed.report_type, Some(ReportType::Inventario));
    assert_eq!(parsed.starts_on, Some(date(2024, 9, 1)));
    assert_eq!(parsed.ends_on, Some(date(2024, 9, 30)));
}

#[test]
fn numeric_dates_are_read_day_first() {
    let parsed = parse_prompt("ventas del 05/03/24 al 20-04-2024 en json", today());

    assert_eq!(parsed.format, Some(ReportFormat::Json));
    assert_eq!(parsed.starts_on, Some(date(2024, 3, 5)));
    assert_eq!(parsed.ends_on, Some(date(2024, 4, 20)));
}

#[test]
fn relative_phrases_resolve_against_today() {
    let last_month = parse_prompt("ventas del último mes", today());
    assert_eq!(last_month.starts_on, Some(date(2024, 9, 1)));
    assert_eq!(last_month.ends_on, Some(date(2024, 9, 30)));

    let last_quarter = parse_prompt("finanzas del trimestre pasado", today());
    assert_eq!(last_quarter.report_type, Some(ReportType::Financiero));
    assert_eq!(last_quarter.starts_on, Some(date(2024, 7, 1)));
    assert_eq!(last_quarter.ends_on, Some(date(2024, 9, 30)));
}

#[test]
fn longer_type_keywords_win() {
    let parsed = parse_prompt("ventas por producto", today());
    assert_eq!(parsed.report_type, Some(ReportType::Productos));
}

#[test]
fn type_keywords_require_word_boundaries() {
    let parsed = parse_prompt("reporte de reventas", today());
    assert_eq!(parsed.report_type, None);
    assert!(parsed.needs_ai());
}

#[test]
fn por_mes_implies_monthly_grouping() {
    let parsed = parse_prompt("ventas por mes en excel", today());
    assert_eq!(parsed.group_by, Some(GroupBy::Mes));
}

#[test]
fn mostrar_clause_maps_to_canonical_fields() {
    let parsed = parse_prompt(
        "ventas de marzo, mostrar cliente, monto total y fecha.",
        today(),
    );

    assert_eq!(
        parsed.fields,
        Some(vec![
            ReportField::NombreCliente,
            ReportField::MontoTotal,
            ReportField::Fechas,
        ])
    );
}

#[test]
fn defaults_fill_missing_type_format_and_range() {
    let parameters = parse_prompt("algo sin sentido", today()).into_parameters(today());

    assert_eq!(parameters.report_type, ReportType::Ventas);
    assert_eq!(parameters.format, ReportFormat::Pdf);
    assert_eq!(parameters.starts_on, Some(date(2024, 10, 1)));
    assert_eq!(parameters.ends_on, Some(date(2024, 10, 31)));
    assert!(parameters.include_charts);
    assert_eq!(
        parameters.description,
        "Reporte de ventas del 01/10/2024 al 31/10/2024 (PDF)"
    );
}

#[test]
fn ai_hints_override_rule_results_and_ignore_garbage() {
    let mut parsed = parse_prompt("algo sin sentido", today());
    parsed.merge_ai_hints(AiReportHints {
        tipo: Some("productos".to_owned()),
        formato: Some("docx".to_owned()),
        fecha_inicio: Some("2024-01-01".to_owned()),
        fecha_fin: Some("no es fecha".to_owned()),
        agrupar_por: None,
        incluir_graficos: Some(false),
    });
    let parameters = parsed.into_parameters(today());

    assert_eq!(parameters.report_type, ReportType::Productos);
    assert_eq!(parameters.format, ReportFormat::Pdf);
    assert_eq!(parameters.starts_on, Some(date(2024, 1, 1)));
    assert_eq!(parameters.ends_on, Some(date(2024, 10, 31)));
    assert!(!parameters.include_charts);
}

#[test]
fn month_bounds_handle_december() {
    assert_eq!(
        month_bounds(2023, 12),
        Some((date(2023, 12, 1), date(2023, 12, 31)))
    );
}

proptest! {
    #[test]
    fn any_prompt_yields_a_valid_range(prompt in "\\PC{0,80}") {
        let parameters = parse_prompt(&prompt, today()).into_parameters(today());

        prop_assert!(parameters.validate_range().is_ok());
        prop_assert!(parameters.starts_on.is_some());
        prop_assert!(parameters.ends_on.is_some());
        prop_assert!(!parameters.description.is_empty());
    }
}
