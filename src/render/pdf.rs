//! PDF rendering of the price sheet
//!
//! Lays the records out as an A4 table using the PDF builtin fonts. The first
//! page carries the themed title band; every page repeats the column header
//! and ends with a dated footer.

use std::ops::Range;

use chrono::{Local, NaiveDate};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};
use tracing::warn;

use super::{RenderError, Theme};
use crate::data::ProductRecord;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_HEIGHT: f32 = 16.0;
const TITLE_GAP: f32 = 6.0;
const ROW_HEIGHT: f32 = 8.0;
const FOOTER_HEIGHT: f32 = 8.0;
const CELL_PADDING: f32 = 2.0;
const BORDER: f32 = 0.3;

const TITLE_SIZE: f32 = 18.0;
const TEXT_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

/// Millimetres per typographic point
const PT_TO_MM: f32 = 0.3528;
/// Average glyph width of the builtin fonts, as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;

/// Column titles and widths in millimetres; they span the printable width
const COLUMNS: [(&str, f32); 3] = [("ID", 35.0), ("Name", 110.0), ("Price", 35.0)];

const LAYER: &str = "Sheet";

/// Renders the PDF price sheet dated today
pub fn render_pdf(records: &[ProductRecord], theme: &Theme) -> Result<Vec<u8>, RenderError> {
    render_document(records, theme, Local::now().date_naive())
}

/// Renders the PDF price sheet with an explicit generation date
pub fn render_document(
    records: &[ProductRecord],
    theme: &Theme,
    generated_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        theme.header_text.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER,
    );
    let fonts = Fonts::load(&doc, &theme.font_family)?;
    let palette = Palette::from_theme(theme);
    let date = generated_on.format("%Y-%m-%d").to_string();

    let pages = paginate(records.len());
    for (index, rows) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            doc.get_page(page).get_layer(layer)
        };

        let sheet = PageCanvas {
            layer: &layer,
            fonts: &fonts,
            palette: &palette,
        };
        sheet.fill_page();

        let mut top = PAGE_HEIGHT - MARGIN;
        if index == 0 {
            sheet.title(&theme.header_text, top);
            top -= TITLE_HEIGHT + TITLE_GAP;
        }
        top = sheet.column_header(top);
        for record in &records[rows.clone()] {
            top = sheet.row(record, top);
        }
        sheet.footer(&format!(
            "Generated {}, page {} of {}",
            date,
            index + 1,
            pages.len()
        ));
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Splits `count` rows into per-page ranges; always yields at least one page
pub fn paginate(count: usize) -> Vec<Range<usize>> {
    let body = PAGE_HEIGHT - 2.0 * MARGIN - FOOTER_HEIGHT - ROW_HEIGHT;
    let first = ((body - TITLE_HEIGHT - TITLE_GAP) / ROW_HEIGHT) as usize;
    let rest = (body / ROW_HEIGHT) as usize;

    let mut pages = vec![0..count.min(first)];
    let mut start = pages[0].end;
    while start < count {
        let end = (start + rest).min(count);
        pages.push(start..end);
        start = end;
    }
    pages
}

/// Shortens `text` so it fits `width` millimetres at `size` points
fn fit(text: &str, width: f32, size: f32) -> String {
    let max = ((width - 2.0 * CELL_PADDING) / (size * GLYPH_WIDTH * PT_TO_MM)) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH * PT_TO_MM
}

fn pdf_error(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Regular and bold builtin fonts matching the theme's family
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference, family: &str) -> Result<Self, RenderError> {
        let (regular, bold) = builtin_family(family);
        Ok(Self {
            regular: doc.add_builtin_font(regular).map_err(pdf_error)?,
            bold: doc.add_builtin_font(bold).map_err(pdf_error)?,
        })
    }
}

/// Maps a CSS-style font family onto the closest PDF builtin family
fn builtin_family(family: &str) -> (BuiltinFont, BuiltinFont) {
    let family = family.to_lowercase();
    if family.contains("courier") || family.contains("mono") {
        (BuiltinFont::Courier, BuiltinFont::CourierBold)
    } else if family.contains("times") || (family.contains("serif") && !family.contains("sans")) {
        (BuiltinFont::TimesRoman, BuiltinFont::TimesBold)
    } else {
        (BuiltinFont::Helvetica, BuiltinFont::HelveticaBold)
    }
}

/// Theme colours resolved to RGB
struct Palette {
    header: Rgb,
    text: Rgb,
    background: Rgb,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Self {
        let defaults = Theme::default();
        let resolve = |value: &str, fallback: &str| {
            parse_color(value).unwrap_or_else(|| {
                warn!(color = value, "Unrecognized colour; using default");
                parse_color(fallback).unwrap_or((0.0, 0.0, 0.0))
            })
        };
        let rgb = |(r, g, b): (f32, f32, f32)| Rgb::new(r, g, b, None);

        Self {
            header: rgb(resolve(&theme.header_color, &defaults.header_color)),
            text: rgb(resolve(&theme.text_color, &defaults.text_color)),
            background: rgb(resolve(&theme.background_color, &defaults.background_color)),
        }
    }
}

/// Parses `#rgb`, `#rrggbb` or a basic colour name into unit RGB components
pub fn parse_color(value: &str) -> Option<(f32, f32, f32)> {
    let value = value.trim();
    let named = match value.to_lowercase().as_str() {
        "black" => Some("000000"),
        "white" => Some("ffffff"),
        "red" => Some("ff0000"),
        "green" => Some("008000"),
        "blue" => Some("0000ff"),
        "gray" | "grey" => Some("808080"),
        _ => None,
    };
    let hex = named.or_else(|| value.strip_prefix('#'))?;

    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| f32::from(v) / 255.0);
    match hex.len() {
        6 if hex.is_ascii() => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 if hex.is_ascii() => {
            let short = |i: usize| channel(&hex[i..=i].repeat(2));
            Some((short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// Drawing helpers for one page; `top` arguments are millimetres from the bottom edge
struct PageCanvas<'a> {
    layer: &'a PdfLayerReference,
    fonts: &'a Fonts,
    palette: &'a Palette,
}

impl PageCanvas<'_> {
    fn fill(&self, color: &Rgb, left: f32, bottom: f32, right: f32, top: f32) {
        self.layer.set_fill_color(Color::Rgb(color.clone()));
        self.layer
            .add_rect(Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top)));
    }

    fn text(&self, color: &Rgb, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.layer.set_fill_color(Color::Rgb(color.clone()));
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn fill_page(&self) {
        self.fill(&self.palette.background, 0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT);
    }

    fn title(&self, text: &str, top: f32) {
        let bottom = top - TITLE_HEIGHT;
        self.fill(&self.palette.header, MARGIN, bottom, PAGE_WIDTH - MARGIN, top);

        let text = fit(text, PAGE_WIDTH - 2.0 * MARGIN, TITLE_SIZE);
        let x = (PAGE_WIDTH - text_width(&text, TITLE_SIZE)) / 2.0;
        let y = bottom + (TITLE_HEIGHT - TITLE_SIZE * PT_TO_MM) / 2.0 + 1.0;
        self.text(&self.palette.background, &text, TITLE_SIZE, x.max(MARGIN), y, &self.fonts.bold);
    }

    /// Draws the column titles; returns the new top
    fn column_header(&self, top: f32) -> f32 {
        let bottom = top - ROW_HEIGHT;
        self.fill(&self.palette.header, MARGIN, bottom, PAGE_WIDTH - MARGIN, top);
        let titles = COLUMNS.map(|(title, _)| title.to_string());
        self.cells(&titles, &self.palette.background, &self.fonts.bold, bottom);
        self.grid(top, bottom);
        bottom
    }

    /// Draws one record row; returns the new top
    fn row(&self, record: &ProductRecord, top: f32) -> f32 {
        let bottom = top - ROW_HEIGHT;
        let cells = [
            record.product_id.to_string(),
            record.name.clone(),
            record.price.clone(),
        ];
        self.cells(&cells, &self.palette.text, &self.fonts.regular, bottom);
        self.grid(top, bottom);
        bottom
    }

    fn cells(&self, values: &[String; 3], color: &Rgb, font: &IndirectFontRef, bottom: f32) {
        let baseline = bottom + (ROW_HEIGHT - TEXT_SIZE * PT_TO_MM) / 2.0;
        let mut left = MARGIN;
        for ((_, width), value) in COLUMNS.iter().zip(values) {
            let value = fit(value, *width, TEXT_SIZE);
            self.text(color, &value, TEXT_SIZE, left + CELL_PADDING, baseline, font);
            left += width;
        }
    }

    /// Outlines a row band and its column separators in the text colour
    fn grid(&self, top: f32, bottom: f32) {
        let text = &self.palette.text;
        let right = PAGE_WIDTH - MARGIN;
        self.fill(text, MARGIN, top - BORDER / 2.0, right, top + BORDER / 2.0);
        self.fill(text, MARGIN, bottom - BORDER / 2.0, right, bottom + BORDER / 2.0);

        let mut x = MARGIN;
        self.fill(text, x - BORDER / 2.0, bottom, x + BORDER / 2.0, top);
        for (_, width) in COLUMNS {
            x += width;
            self.fill(text, x - BORDER / 2.0, bottom, x + BORDER / 2.0, top);
        }
    }

    fn footer(&self, text: &str) {
        let y = MARGIN + (FOOTER_HEIGHT - FOOTER_SIZE * PT_TO_MM) / 2.0;
        self.text(&self.palette.text, text, FOOTER_SIZE, MARGIN, y, &self.fonts.regular);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProductId;

    fn record(id: &str, name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            product_id: ProductId::parse(id).unwrap(),
            name: name.to_string(),
            price: price.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_columns_span_printable_width() {
        let total: f32 = COLUMNS.iter().map(|(_, w)| w).sum();
        assert!((total - (PAGE_WIDTH - 2.0 * MARGIN)).abs() < 0.001);
    }

    #[test]
    fn test_paginate_empty_sheet_has_one_page() {
        assert_eq!(paginate(0), vec![0..0]);
    }

    #[test]
    fn test_paginate_splits_after_first_page() {
        let first = paginate(1_000)[0].end;
        assert!(first > 0);

        assert_eq!(paginate(first), vec![0..first]);

        let pages = paginate(first + 1);
        assert_eq!(pages, vec![0..first, first..first + 1]);
    }

    #[test]
    fn test_paginate_covers_every_row_once() {
        let pages = paginate(250);
        assert!(pages.len() > 2);
        assert_eq!(pages.first().unwrap().start, 0);
        assert_eq!(pages.last().unwrap().end, 250);
        for pair in pages.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // Later pages have no title band, so they hold more rows
        assert!(pages[1].len() > pages[0].len());
    }

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit("Red", 35.0, TEXT_SIZE), "Red");

        let long = "x".repeat(500);
        let fitted = fit(&long, 35.0, TEXT_SIZE);
        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() < 500);
        assert!(text_width(&fitted, TEXT_SIZE) <= 35.0 - 2.0 * CELL_PADDING);
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#FFFFFF"), Some((1.0, 1.0, 1.0)));
        assert_eq!(parse_color("#000"), Some((0.0, 0.0, 0.0)));
        assert_eq!(parse_color("#f00"), Some((1.0, 0.0, 0.0)));
        assert_eq!(parse_color(" Blue "), Some((0.0, 0.0, 1.0)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#GGGGGG"), None);
        assert_eq!(parse_color("chartreuse"), None);
        assert_eq!(parse_color("333333"), None);
    }

    #[test]
    fn test_builtin_family_mapping() {
        assert!(matches!(builtin_family("Arial").0, BuiltinFont::Helvetica));
        assert!(matches!(builtin_family("Times New Roman").0, BuiltinFont::TimesRoman));
        assert!(matches!(builtin_family("serif").0, BuiltinFont::TimesRoman));
        assert!(matches!(builtin_family("sans-serif").0, BuiltinFont::Helvetica));
        assert!(matches!(builtin_family("Courier New").1, BuiltinFont::CourierBold));
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let records = vec![record("1", "Red Paint", "$10"), record("2", "Blue Paint", "$12")];

        let bytes = render_document(&records, &Theme::default(), date()).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_handles_multiple_pages_and_odd_themes() {
        let records: Vec<_> = (0..120)
            .map(|i| record(&i.to_string(), &"Long name ".repeat(20), "$12.50"))
            .collect();
        let theme = Theme {
            header_text: "Shop <Sheet>".to_string(),
            header_color: "not-a-colour".to_string(),
            font_family: "Courier".to_string(),
            ..Theme::default()
        };

        let bytes = render_document(&records, &theme, date()).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }
}
