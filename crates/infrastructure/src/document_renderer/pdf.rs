//! Flowing A4 layout over `pdf-writer`: the two standard Helvetica faces with
//! WinAnsi encoding, text, filled rectangles and strokes.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use smartsales_application::ChartSeries;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;
const CHART_HEIGHT: f32 = 170.0;

const CATALOG_ID: Ref = Ref::new(1);
const PAGE_TREE_ID: Ref = Ref::new(2);
const REGULAR_FONT_ID: Ref = Ref::new(3);
const BOLD_FONT_ID: Ref = Ref::new(4);
const FIRST_PAGE_ID: i32 = 5;

/// Font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"F1"),
            Self::Bold => Name(b"F2"),
        }
    }
}

/// Flowing document builder that paginates automatically.
pub(crate) struct PdfBuilder {
    pages: Vec<Content>,
    current: Content,
    blank: bool,
    cursor: f32,
}

impl PdfBuilder {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Content::new(),
            blank: true,
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn content_width() -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.cursor - needed < MARGIN {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::replace(&mut self.current, Content::new());
        self.pages.push(finished);
        self.blank = true;
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn text_at(&mut self, x: f32, y: f32, size: f32, face: Face, text: &str) {
        let encoded = win_ansi(text);
        self.blank = false;
        self.current.begin_text();
        self.current.set_font(face.resource(), size);
        self.current.next_line(x, y);
        self.current.show(Str(&encoded));
        self.current.end_text();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: (f32, f32, f32)) {
        self.blank = false;
        self.current.save_state();
        self.current.set_fill_rgb(rgb.0, rgb.1, rgb.2);
        self.current.rect(x, y, width, height);
        self.current.fill_nonzero();
        self.current.restore_state();
    }

    fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.blank = false;
        self.current.save_state();
        self.current.set_line_width(0.6);
        self.current.move_to(x1, y1);
        self.current.line_to(x2, y2);
        self.current.stroke();
        self.current.restore_state();
    }

    /// Writes one line of text and advances the cursor.
    pub(crate) fn line(&mut self, text: &str, size: f32, face: Face) {
        let height = size * 1.5;
        self.ensure_space(height);
        self.cursor -= height;
        let fitted = fit(text, Self::content_width(), size);
        self.text_at(MARGIN, self.cursor, size, face, &fitted);
    }

    /// Inserts vertical space.
    pub(crate) fn gap(&mut self, height: f32) {
        self.cursor -= height;
        if self.cursor < MARGIN {
            self.new_page();
        }
    }

    /// Writes a `label: value` pair.
    pub(crate) fn field(&mut self, label: &str, value: &str) {
        let size = 10.0;
        let height = size * 1.5;
        self.ensure_space(height);
        self.cursor -= height;
        let label = format!("{label}:");
        self.text_at(MARGIN, self.cursor, size, Face::Bold, &label);
        let offset = 170.0;
        let fitted = fit(value, Self::content_width() - offset, size);
        self.text_at(MARGIN + offset, self.cursor, size, Face::Regular, &fitted);
    }

    /// Draws a table with a shaded header row, repeating the header on new pages.
    ///
    /// A table without rows keeps its header followed by `empty_note`.
    pub(crate) fn table(&mut self, headers: &[&str], rows: &[Vec<String>], empty_note: &str) {
        if headers.is_empty() {
            return;
        }
        let size = 8.5;
        let row_height = size * 2.0;
        let column_width = Self::content_width() / headers.len() as f32;

        self.table_header(headers, column_width, size, row_height);
        if rows.is_empty() {
            self.cursor -= row_height;
            self.text_at(MARGIN + 3.0, self.cursor + size * 0.6, size, Face::Regular, empty_note);
            return;
        }
        for row in rows {
            if self.cursor - row_height < MARGIN {
                self.new_page();
                self.table_header(headers, column_width, size, row_height);
            }
            self.cursor -= row_height;
            for (index, cell) in row.iter().enumerate().take(headers.len()) {
                let x = MARGIN + column_width * index as f32 + 3.0;
                let fitted = fit(cell, column_width - 6.0, size);
                self.text_at(x, self.cursor + size * 0.6, size, Face::Regular, &fitted);
            }
            let right = MARGIN + Self::content_width();
            self.rule(MARGIN, self.cursor, right, self.cursor);
        }
    }

    fn table_header(&mut self, headers: &[&str], column_width: f32, size: f32, row_height: f32) {
        self.ensure_space(row_height * 2.0);
        self.cursor -= row_height;
        self.fill_rect(
            MARGIN,
            self.cursor,
            Self::content_width(),
            row_height,
            (0.85, 0.89, 0.95),
        );
        for (index, header) in headers.iter().enumerate() {
            let x = MARGIN + column_width * index as f32 + 3.0;
            let fitted = fit(header, column_width - 6.0, size);
            self.text_at(x, self.cursor + size * 0.6, size, Face::Bold, &fitted);
        }
    }

    /// Draws a vertical bar chart scaled to the largest value.
    pub(crate) fn bar_chart(&mut self, series: &ChartSeries) {
        if series.values.is_empty() {
            return;
        }
        self.ensure_space(CHART_HEIGHT + 50.0);
        self.line(&series.title, 11.0, Face::Bold);

        let baseline = self.cursor - CHART_HEIGHT - 10.0;
        let width = Self::content_width();
        let slot = width / series.values.len() as f32;
        let max = series
            .values
            .iter()
            .copied()
            .fold(0.0_f64, f64::max)
            .max(f64::EPSILON);

        self.rule(MARGIN, baseline, MARGIN + width, baseline);
        for (index, (label, value)) in series.labels.iter().zip(&series.values).enumerate() {
            let height = (value.max(0.0) / max) as f32 * (CHART_HEIGHT - 20.0);
            let x = MARGIN + slot * index as f32 + slot * 0.15;
            let bar_width = slot * 0.7;
            self.fill_rect(x, baseline, bar_width, height, (0.26, 0.45, 0.76));
            let amount = fit(&format!("{value:.2}"), slot, 6.5);
            self.text_at(x, baseline + height + 3.0, 6.5, Face::Regular, &amount);
            let caption = fit(label, slot, 6.5);
            self.text_at(x, baseline - 10.0, 6.5, Face::Regular, &caption);
        }

        self.cursor = baseline - 20.0;
    }

    #[cfg(test)]
    fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.blank || self.pages.is_empty())
    }

    /// Writes the page tree, fonts and content streams into a PDF file.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        if !self.blank || self.pages.is_empty() {
            self.new_page();
        }
        let page_refs = (FIRST_PAGE_ID..)
            .step_by(2)
            .take(self.pages.len())
            .map(|id| (Ref::new(id), Ref::new(id + 1)))
            .collect::<Vec<_>>();

        let mut pdf = Pdf::new();
        pdf.catalog(CATALOG_ID).pages(PAGE_TREE_ID);
        pdf.pages(PAGE_TREE_ID)
            .kids(page_refs.iter().map(|(page_id, _)| *page_id))
            .count(i32::try_from(page_refs.len()).unwrap_or(i32::MAX));
        pdf.type1_font(REGULAR_FONT_ID)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(BOLD_FONT_ID)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for (content, (page_id, content_id)) in self.pages.into_iter().zip(page_refs) {
            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(PAGE_TREE_ID);
            page.contents(content_id);
            page.resources()
                .fonts()
                .pair(Face::Regular.resource(), REGULAR_FONT_ID)
                .pair(Face::Bold.resource(), BOLD_FONT_ID);
            page.finish();
            pdf.stream(content_id, &content.finish());
        }

        pdf.finish()
    }
}

/// Encodes text for the WinAnsi standard fonts; unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|character| match character {
            '\n' | '\r' | '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            other => u8::try_from(u32::from(other))
                .ok()
                .filter(|byte| !(0x80..0xA0).contains(byte))
                .unwrap_or(b'?'),
        })
        .collect()
}

/// Truncates `text` with an ellipsis so it fits `width` points at `size`.
fn fit(text: &str, width: f32, size: f32) -> String {
    let capacity = (width / (size * AVERAGE_GLYPH_WIDTH)).floor().max(1.0) as usize;
    if text.chars().count() <= capacity {
        return text.to_owned();
    }
    let kept = capacity.saturating_sub(3);
    let mut fitted = text.chars().take(kept).collect::<String>();
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::{Face, PdfBuilder, fit, win_ansi};

    #[test]
    fn document_has_header_and_trailer() {
        let mut builder = PdfBuilder::new();
        builder.line("Reporte de Inventario", 16.0, Face::Bold);
        assert_eq!(builder.page_count(), 1);
        let bytes = builder.finish();

        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Helvetica-Bold"));
        assert!(text.contains("(Reporte de Inventario)"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn long_tables_spill_onto_new_pages() {
        let mut builder = PdfBuilder::new();
        let rows = (0..120)
            .map(|index| vec![index.to_string(), format!("Producto {index}")])
            .collect::<Vec<_>>();
        builder.table(&["ID", "Nombre"], &rows, "Sin registros");

        assert!(builder.page_count() > 1);
        let text = String::from_utf8_lossy(&builder.finish()).into_owned();
        assert!(text.contains("(Producto 119)"));
        assert!(!text.contains("Sin registros"));
    }

    #[test]
    fn empty_tables_keep_header_and_note() {
        let mut builder = PdfBuilder::new();
        builder.table(&["Nombre", "Stock"], &[], "Sin registros");
        let text = String::from_utf8_lossy(&builder.finish()).into_owned();

        assert!(text.contains("(Nombre)"));
        assert!(text.contains("(Sin registros)"));
    }

    #[test]
    fn text_is_win_ansi_encoded_and_fitted() {
        assert_eq!(win_ansi("año€"), vec![b'a', 0xF1, b'o', 0x80]);
        assert_eq!(win_ansi("¿Qué?\n"), vec![0xBF, b'Q', b'u', 0xE9, b'?', b' ']);
        assert_eq!(win_ansi("Ω"), vec![b'?']);
        assert_eq!(fit("Refrigerador", 20.0, 8.0), "Re...");
        assert_eq!(fit("TV", 100.0, 8.0), "TV");
    }
}
