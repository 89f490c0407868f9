//! PDF documents: the full patient report and a single-visit prescription.
//!
//! Documents are first laid out as a flat list of [`Item`]s, then
//! [`paginate`] assigns each text line a page and a vertical position, and
//! [`render`] draws the result with `printpdf` built-in fonts. Keeping the
//! layout pure lets tests inspect content and page breaks without parsing
//! PDF bytes.

mod patient_report;
mod prescription;

pub use patient_report::*;
pub use prescription::*;

use std::io::BufWriter;

use chrono::{DateTime, TimeZone, Utc};
use printpdf::*;
use thiserror::Error;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const TOP_MM: f32 = 277.0;
pub const BOTTOM_MM: f32 = 20.0;
pub const FOOTER_MM: f32 = 10.0;
pub const LEFT_MM: f32 = 20.0;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

// ─── Layout ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    /// Left edge in millimetres.
    pub x: f32,
    /// Vertical space consumed by the line, in millimetres.
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(TextLine),
    /// Blank vertical space. Dropped at the top of a page.
    Space(f32),
    /// Start a new page unless this much room is left.
    Keep(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub line: TextLine,
    /// Baseline, measured up from the bottom edge.
    pub y: f32,
}

/// Builder for a document's item list.
#[derive(Debug, Default)]
pub struct Layout {
    items: Vec<Item>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl Into<String>, size: f32, bold: bool, x: f32) -> &mut Self {
        self.items.push(Item::Text(TextLine {
            text: text.into(),
            size,
            bold,
            x,
            height: line_height(size),
        }));
        self
    }

    /// Word-wrapped body text at `x`.
    pub fn paragraph(&mut self, text: &str, size: f32, x: f32) -> &mut Self {
        let max_chars = chars_per_line(size, x);
        for line in wrap_text(text, max_chars) {
            self.line(line, size, false, x);
        }
        self
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.keep(20.0);
        self.line(text, 12.0, true, LEFT_MM)
    }

    /// "Label: value" with the value wrapped under the label's indent.
    pub fn field(&mut self, label: &str, value: &str, x: f32) -> &mut Self {
        self.paragraph(&format!("{label}: {value}"), 10.0, x)
    }

    pub fn space(&mut self, mm: f32) -> &mut Self {
        self.items.push(Item::Space(mm));
        self
    }

    pub fn keep(&mut self, mm: f32) -> &mut Self {
        self.items.push(Item::Keep(mm));
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All text, one entry per line, for assertions.
    pub fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Text(line) => Some(line.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn line_height(size: f32) -> f32 {
    (size * 0.5).max(4.0)
}

/// Rough Helvetica capacity of the printable width at `size` points.
fn chars_per_line(size: f32, x: f32) -> usize {
    let width_mm = PAGE_WIDTH_MM - x - LEFT_MM;
    // average glyph is about half an em; 1pt = 0.3528mm
    let glyph_mm = size * 0.3528 * 0.5;
    ((width_mm / glyph_mm) as usize).max(10)
}

/// Simple word-wrap helper for PDF text rendering.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Place items on A4 pages top to bottom.
pub fn paginate(items: &[Item]) -> Vec<Vec<PlacedLine>> {
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut y = TOP_MM;

    for item in items {
        match item {
            Item::Space(mm) => {
                if y < TOP_MM {
                    y -= mm;
                }
            }
            Item::Keep(mm) => {
                if y - mm < BOTTOM_MM && y < TOP_MM {
                    pages.push(Vec::new());
                    y = TOP_MM;
                }
            }
            Item::Text(line) => {
                if y - line.height < BOTTOM_MM {
                    pages.push(Vec::new());
                    y = TOP_MM;
                }
                if let Some(page) = pages.last_mut() {
                    page.push(PlacedLine {
                        line: line.clone(),
                        y,
                    });
                }
                y -= line.height;
            }
        }
    }
    pages
}

// ─── Rendering ──────────────────────────────────────────────

fn pdf_error<E: std::fmt::Display>(context: &str) -> impl Fn(E) -> ReportError + '_ {
    move |e| ReportError::Pdf(format!("{context}: {e}"))
}

/// Draw paginated lines. `footer(page, total)` text goes at the bottom of
/// every page when it returns `Some`.
pub fn render(
    title: &str,
    pages: &[Vec<PlacedLine>],
    footer: impl Fn(usize, usize) -> Option<String>,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error("PDF font error"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error("PDF font error"))?;

    let total = pages.len().max(1);
    let mut layer = doc.get_page(page1).get_layer(layer1);
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
        }
        for placed in page {
            let face = if placed.line.bold { &bold } else { &font };
            layer.use_text(placed.line.text.as_str(), placed.line.size, Mm(placed.line.x), Mm(placed.y), face);
        }
        if let Some(text) = footer(index + 1, total) {
            layer.use_text(text, 8.0, Mm(LEFT_MM), Mm(FOOTER_MM), &font);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(pdf_error("PDF save error"))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))
}

// ─── Formatting helpers ─────────────────────────────────────

pub fn format_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%-d %b %Y").to_string()
}

pub fn format_time<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%I:%M %p").to_string()
}

/// `Ravi Kumar` → `Ravi_Kumar`
pub fn filename_stem(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_newlines() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert_eq!(wrap_text("a\nb", 80), vec!["a", "b"]);
        assert_eq!(wrap_text("", 80), vec![""]);
    }

    #[test]
    fn long_layout_spills_onto_more_pages() {
        let mut layout = Layout::new();
        for i in 0..120 {
            layout.line(format!("line {i}"), 10.0, false, LEFT_MM);
        }
        let pages = paginate(layout.items());
        assert!(pages.len() >= 3);
        for page in &pages {
            assert!(page.iter().all(|p| p.y - p.line.height >= BOTTOM_MM));
        }
        let count: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(count, 120);
    }

    #[test]
    fn keep_moves_block_to_next_page() {
        let mut layout = Layout::new();
        // fill to roughly 30mm above the bottom margin
        for _ in 0..((TOP_MM - BOTTOM_MM - 30.0) / 5.0) as usize {
            layout.line("filler", 10.0, false, LEFT_MM);
        }
        layout.keep(60.0).line("Visit 1", 11.0, true, LEFT_MM);
        let pages = paginate(layout.items());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1][0].line.text, "Visit 1");
        assert_eq!(pages[1][0].y, TOP_MM);
    }

    #[test]
    fn space_is_dropped_at_page_top() {
        let mut layout = Layout::new();
        layout.space(15.0).line("first", 10.0, false, LEFT_MM);
        let pages = paginate(layout.items());
        assert_eq!(pages[0][0].y, TOP_MM);
    }

    #[test]
    fn render_produces_pdf_with_footer() {
        let mut layout = Layout::new();
        layout.line("Hello", 12.0, true, LEFT_MM);
        let bytes = render("Test", &paginate(layout.items()), |p, n| Some(format!("Page {p} of {n}"))).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn filename_stem_collapses_whitespace() {
        assert_eq!(filename_stem("  Ravi   Kumar "), "Ravi_Kumar");
    }
}
