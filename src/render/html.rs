//! HTML rendering of the price sheet
//!
//! Builds a self-contained HTML document with a themed header band and a
//! table of product records.

use std::fmt::Write as _;

use chrono::{Local, NaiveDate};

use super::Theme;
use crate::data::ProductRecord;

/// Renders the HTML price sheet dated today
pub fn render_html(records: &[ProductRecord], theme: &Theme) -> String {
    render_document(records, theme, Local::now().date_naive())
}

/// Renders the price sheet with an explicit generation date
pub fn render_document(records: &[ProductRecord], theme: &Theme, generated_on: NaiveDate) -> String {
    let mut rows = String::new();
    for record in records {
        // Writing to a String cannot fail
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(record.product_id.as_str()),
            escape(&record.name),
            escape(&record.price),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
@page {{
    size: A4;
    margin: 15mm;
}}

body {{
    font-family: {font}, sans-serif;
    color: {text};
    background-color: {background};
}}

h1 {{
    background-color: {header};
    color: {background};
    text-align: center;
    padding: 10px 0;
}}

table {{
    width: 100%;
    border-collapse: collapse;
}}

th, td {{
    border: 1px solid {text};
    padding: 8px;
    text-align: left;
}}

th {{
    background-color: {header};
    color: {background};
}}

footer {{
    margin-top: 12px;
    font-size: 0.8em;
}}
</style>
</head>
<body>
<h1>{title}</h1>
<table>
<thead><tr><th>ID</th><th>Name</th><th>Price</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<footer>Generated {date}</footer>
</body>
</html>
"#,
        title = escape(&theme.header_text),
        font = css_value(&theme.font_family),
        text = css_value(&theme.text_color),
        background = css_value(&theme.background_color),
        header = css_value(&theme.header_color),
        rows = rows,
        date = generated_on.format("%Y-%m-%d"),
    )
}

/// Escapes text for inclusion in HTML content
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keeps theme values from closing the style block or a declaration
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
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
    fn test_rows_follow_record_order() {
        let records = vec![record("1", "Red Paint", "$10"), record("2", "Blue Paint", "$12")];

        let html = render_document(&records, &Theme::default(), date());

        let red = html.find("<td>Red Paint</td>").expect("red row");
        let blue = html.find("<td>Blue Paint</td>").expect("blue row");
        assert!(red < blue);
        assert!(html.contains("<tr><td>1</td><td>Red Paint</td><td>$10</td></tr>"));
        assert!(html.contains("<th>ID</th><th>Name</th><th>Price</th>"));
    }

    #[test]
    fn test_theme_is_applied() {
        let theme = Theme {
            header_text: "My Sheet".to_string(),
            header_color: "#FF0000".to_string(),
            text_color: "#00FF00".to_string(),
            background_color: "#0000FF".to_string(),
            font_family: "Comic Sans".to_string(),
        };

        let html = render_document(&[], &theme, date());

        assert!(html.contains("<h1>My Sheet</h1>"));
        assert!(html.contains("font-family: Comic Sans, sans-serif;"));
        assert!(html.contains("background-color: #FF0000;"));
        assert!(html.contains("color: #00FF00;"));
        assert!(html.contains("background-color: #0000FF;"));
        assert!(html.contains("Generated 2026-10-19"));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let records = vec![record("3", "Black & <White>", "\"$5\"")];

        let html = render_document(&records, &Theme::default(), date());

        assert!(html.contains("<td>Black &amp; &lt;White&gt;</td>"));
        assert!(html.contains("<td>&quot;$5&quot;</td>"));
    }

    #[test]
    fn test_css_values_cannot_escape_style_block() {
        let theme = Theme {
            font_family: "Arial;}</style><script>".to_string(),
            ..Theme::default()
        };

        let html = render_document(&[], &theme, date());

        assert!(!html.contains("<script>"));
        assert_eq!(html.matches("</style>").count(), 1);
    }
}
