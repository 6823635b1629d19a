//! Printable price sheet rendering
//!
//! The sheet is written as PDF, or as a self-contained HTML document when the
//! output path ends in `.html` or `.htm`.

mod html;
mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::data::ProductRecord;

pub use html::render_html;
pub use pdf::render_pdf;

/// Errors that can occur when writing the price sheet
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output file or its directory could not be written
    #[error("Failed to write price sheet to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF document could not be assembled
    #[error("Failed to build PDF document: {0}")]
    Pdf(String),
}

/// Formatting options for the generated price sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Text displayed at the top of the document
    pub header_text: String,
    /// Background of the header band and table header cells
    pub header_color: String,
    pub text_color: String,
    pub background_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_text: "Paint Price Sheet".to_string(),
            header_color: "#333333".to_string(),
            text_color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
            font_family: "Arial".to_string(),
        }
    }
}

/// Document format of the written sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Html,
}

impl OutputFormat {
    /// HTML for `.html`/`.htm` (any case), PDF for everything else
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "html" | "htm" => Self::Html,
            _ => Self::Pdf,
        }
    }
}

/// Writes the rendered price sheet to `output`, creating parent directories
///
/// The format is chosen by [`OutputFormat::from_path`].
///
/// # Returns
/// * `Ok(PathBuf)` - The path written
/// * `Err(RenderError)` - If the document cannot be built or written
pub fn write_price_sheet(
    records: &[ProductRecord],
    theme: &Theme,
    output: impl AsRef<Path>,
) -> Result<PathBuf, RenderError> {
    let output = output.as_ref();
    let io_err = |source| RenderError::Io {
        path: output.to_path_buf(),
        source,
    };

    let format = OutputFormat::from_path(output);
    let bytes = match format {
        OutputFormat::Pdf => render_pdf(records, theme)?,
        OutputFormat::Html => render_html(records, theme).into_bytes(),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(output, bytes).map_err(io_err)?;

    info!(path = %output.display(), rows = records.len(), ?format, "Wrote price sheet");
    Ok(output.to_path_buf())
}
