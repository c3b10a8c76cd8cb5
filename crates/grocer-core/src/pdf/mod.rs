//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;
pub(crate) use extractor::panic_message;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Anything that can render a receipt file as one blob of text.
pub trait TextSource {
    /// Read the file and return its full text, pages joined by newlines.
    fn read_text(&self, path: &Path) -> Result<String>;
}
