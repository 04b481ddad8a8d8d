//! Rule-based extraction of report parameters from Spanish free text.
//!
//! Every step is independent and infallible: a step that finds nothing
//! leaves its slot empty and defaults are applied once, after the optional
//! AI merge.

use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use smartsales_domain::{GroupBy, ReportField, ReportFormat, ReportParameters, ReportType};
use tracing::{debug, warn};

use crate::AiReportHints;

#[cfg(test)]
mod tests;

const TYPE_KEYWORDS: &[(&str, ReportType)] = &[
    ("venta", ReportType::Ventas),
    ("ventas", ReportType::Ventas),
    ("producto", ReportType::Productos),
    ("productos", ReportType::Productos),
    ("cliente", ReportType::Clientes),
    ("clientes", ReportType::Clientes),
    ("inventario", ReportType::Inventario),
    ("stock", ReportType::Inventario),
    ("financiero", ReportType::Financiero),
    ("finanzas", ReportType::Financiero),
];

const FORMAT_KEYWORDS: &[(&str, ReportFormat)] = &[
    ("pdf", ReportFormat::Pdf),
    ("excel", ReportFormat::Excel),
    ("xlsx", ReportFormat::Excel),
    ("json", ReportFormat::Json),
];

const MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

const GROUPING_SYNONYMS: &[(&str, GroupBy)] = &[
    ("producto", GroupBy::Producto),
    ("productos", GroupBy::Producto),
    ("cliente", GroupBy::Cliente),
    ("clientes", GroupBy::Cliente),
    ("categoria", GroupBy::Categoria),
    ("categoría", GroupBy::Categoria),
    ("marca", GroupBy::Marca),
    ("día", GroupBy::Dia),
    ("dia", GroupBy::Dia),
    ("mes", GroupBy::Mes),
    ("año", GroupBy::Anio),
    ("semana", GroupBy::Semana),
];

const MONTH_ALTERNATION: &str = "enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre";

static MONTH_RANGE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"({MONTH_ALTERNATION})\s*(?:de)?\s*(20\d{{2}})?.*?(?:hasta|a|-|al)\s*({MONTH_ALTERNATION})\s*(?:de)?\s*(20\d{{2}})?"
    ))
});
static YEAR: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b"));
static NUMERIC_RANGE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4}).+?(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})")
});
static GROUPING: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"agrupado\s+por\s+(\w+)"));
static FIELDS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"mostrar\s+(.+?)(?:\.|$)"));

/// Parameters detected in a prompt before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPrompt {
    /// Detected subject.
    pub report_type: Option<ReportType>,
    /// Detected format.
    pub format: Option<ReportFormat>,
    /// Detected range start.
    pub starts_on: Option<NaiveDate>,
    /// Detected range end.
    pub ends_on: Option<NaiveDate>,
    /// Detected grouping.
    pub group_by: Option<GroupBy>,
    /// Detected field projection.
    pub fields: Option<Vec<ReportField>>,
    /// Chart toggle supplied by the AI interpretation.
    pub include_charts: Option<bool>,
}

impl ParsedPrompt {
    /// Whether subject or format is still undetected.
    #[must_use]
    pub fn needs_ai(&self) -> bool {
        self.report_type.is_none() || self.format.is_none()
    }

    /// Overlays recognised AI keys on the rule result; unusable values are ignored.
    pub fn merge_ai_hints(&mut self, hints: AiReportHints) {
        if let Some(report_type) = hints.tipo.and_then(|value| value.parse().ok()) {
            self.report_type = Some(report_type);
        }
        if let Some(format) = hints.formato.and_then(|value| value.parse().ok()) {
            self.format = Some(format);
        }
        if let Some(starts_on) = hints.fecha_inicio.as_deref().and_then(parse_iso_date) {
            self.starts_on = Some(starts_on);
        }
        if let Some(ends_on) = hints.fecha_fin.as_deref().and_then(parse_iso_date) {
            self.ends_on = Some(ends_on);
        }
        if let Some(group_by) = hints.agrupar_por.and_then(|value| value.parse().ok()) {
            self.group_by = Some(group_by);
        }
        if hints.incluir_graficos.is_some() {
            self.include_charts = hints.incluir_graficos;
        }
    }

    /// Applies documented defaults and synthesizes the description.
    #[must_use]
    pub fn into_parameters(self, today: NaiveDate) -> ReportParameters {
        let (month_start, month_end) = month_bounds(today.year(), today.month())
            .unwrap_or((today, today));
        let mut starts_on = self.starts_on.unwrap_or(month_start);
        let mut ends_on = self.ends_on.unwrap_or(month_end);
        if ends_on < starts_on {
            std::mem::swap(&mut starts_on, &mut ends_on);
        }

        let mut parameters = ReportParameters {
            report_type: self.report_type.unwrap_or(ReportType::Ventas),
            format: self.format.unwrap_or(ReportFormat::Pdf),
            starts_on: Some(starts_on),
            ends_on: Some(ends_on),
            group_by: self.group_by,
            fields: self.fields,
            description: String::new(),
            include_charts: self.include_charts.unwrap_or(true),
        };
        parameters.description = parameters.synthesize_description();
        parameters
    }
}

/// Runs every rule-based extraction step over `prompt`.
#[must_use]
pub fn parse_prompt(prompt: &str, today: NaiveDate) -> ParsedPrompt {
    let prompt = prompt.to_lowercase();
    let (starts_on, ends_on) = match extract_dates(&prompt, today) {
        Some((starts_on, ends_on)) => (Some(starts_on), Some(ends_on)),
        None => (None, None),
    };

    let parsed = ParsedPrompt {
        report_type: extract_report_type(&prompt),
        format: extract_format(&prompt),
        starts_on,
        ends_on,
        group_by: extract_grouping(&prompt),
        fields: extract_fields(&prompt),
        include_charts: None,
    };
    debug!(?parsed, "prompt parsed by rules");
    parsed
}

fn extract_report_type(prompt: &str) -> Option<ReportType> {
    let mut keywords = TYPE_KEYWORDS.to_vec();
    keywords.sort_by_key(|(keyword, _)| std::cmp::Reverse(keyword.chars().count()));

    keywords
        .into_iter()
        .find(|(keyword, _)| contains_word(prompt, keyword))
        .map(|(_, report_type)| report_type)
}

fn extract_format(prompt: &str) -> Option<ReportFormat> {
    FORMAT_KEYWORDS
        .iter()
        .find(|(keyword, _)| prompt.contains(keyword))
        .map(|(_, format)| *format)
}

fn extract_dates(prompt: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    month_range(prompt, today)
        .or_else(|| single_month(prompt, today))
        .or_else(|| numeric_range(prompt))
        .or_else(|| relative_range(prompt, today))
}

fn month_range(prompt: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let regex = compiled(&MONTH_RANGE, "month range")?;
    let captures = regex.captures(prompt)?;

    let start_month = month_number(captures.get(1)?.as_str())?;
    let end_month = month_number(captures.get(3)?.as_str())?;
    let start_year = captures
        .get(2)
        .and_then(|value| value.as_str().parse::<i32>().ok())
        .unwrap_or_else(|| today.year());
    let end_year = captures
        .get(4)
        .and_then(|value| value.as_str().parse::<i32>().ok())
        .unwrap_or(start_year);

    // An inverted range still covers whole months.
    let (first, last) = if (end_year, end_month) < (start_year, start_month) {
        ((end_year, end_month), (start_year, start_month))
    } else {
        ((start_year, start_month), (end_year, end_month))
    };
    let (starts_on, _) = month_bounds(first.0, first.1)?;
    let (_, ends_on) = month_bounds(last.0, last.1)?;
    Some((starts_on, ends_on))
}

fn single_month(prompt: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let (_, month) = MONTHS.iter().find(|(name, _)| prompt.contains(name))?;
    let year = compiled(&YEAR, "year")
        .and_then(|regex| regex.captures(prompt))
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<i32>().ok())
        .unwrap_or_else(|| today.year());

    month_bounds(year, *month)
}

fn numeric_range(prompt: &str) -> Option<(NaiveDate, NaiveDate)> {
    let regex = compiled(&NUMERIC_RANGE, "numeric range")?;
    let captures = regex.captures(prompt)?;

    let starts_on = parse_day_first(captures.get(1)?.as_str());
    let ends_on = parse_day_first(captures.get(2)?.as_str());
    match (starts_on, ends_on) {
        (Some(starts_on), Some(ends_on)) => Some((starts_on, ends_on)),
        _ => {
            warn!("numeric dates in prompt could not be parsed");
            None
        }
    }
}

fn relative_range(prompt: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let (current_start, current_end) = month_bounds(today.year(), today.month())?;
    let previous_month_end = current_start.pred_opt()?;

    if ["último mes", "ultimo mes", "mes pasado"]
        .iter()
        .any(|phrase| prompt.contains(phrase))
    {
        let (starts_on, _) = month_bounds(previous_month_end.year(), previous_month_end.month())?;
        return Some((starts_on, previous_month_end));
    }

    if ["último trimestre", "ultimo trimestre", "trimestre pasado"]
        .iter()
        .any(|phrase| prompt.contains(phrase))
    {
        let three_months_ago = today.checked_sub_months(Months::new(3))?;
        let (starts_on, _) = month_bounds(three_months_ago.year(), three_months_ago.month())?;
        return Some((starts_on, previous_month_end));
    }

    Some((current_start, current_end))
}

fn extract_grouping(prompt: &str) -> Option<GroupBy> {
    let explicit = compiled(&GROUPING, "grouping")
        .and_then(|regex| regex.captures(prompt))
        .and_then(|captures| captures.get(1))
        .and_then(|word| {
            GROUPING_SYNONYMS
                .iter()
                .find(|(synonym, _)| word.as_str().contains(synonym))
                .map(|(_, group_by)| *group_by)
        });

    explicit.or_else(|| prompt.contains("por mes").then_some(GroupBy::Mes))
}

fn extract_fields(prompt: &str) -> Option<Vec<ReportField>> {
    let regex = compiled(&FIELDS, "fields")?;
    let list = regex.captures(prompt)?.get(1)?.as_str();

    let mut fields = Vec::new();
    for token in list.split(',').flat_map(|part| part.split(" y ")) {
        let token = token.trim();
        let field = if token.contains("cliente") {
            Some(ReportField::NombreCliente)
        } else if token.contains("cantidad") {
            Some(ReportField::CantidadCompras)
        } else if token.contains("monto") || token.contains("total") {
            Some(ReportField::MontoTotal)
        } else if token.contains("fecha") {
            Some(ReportField::Fechas)
        } else if token.contains("producto") {
            Some(ReportField::Producto)
        } else {
            None
        };

        if let Some(field) = field.filter(|field| !fields.contains(field)) {
            fields.push(field);
        }
    }

    (!fields.is_empty()).then_some(fields)
}

fn compiled<'a>(
    regex: &'a LazyLock<Result<Regex, regex::Error>>,
    name: &str,
) -> Option<&'a Regex> {
    match &**regex {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(pattern = name, error = %error, "prompt pattern failed to compile");
            None
        }
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// First and last day of a calendar month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split(['/', '-']);
    let day = parts.next()?.parse::<u32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let year_part = parts.next()?;
    let year = year_part.parse::<i32>().ok()?;
    let year = if year_part.len() <= 2 { 2000 + year } else { year };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
