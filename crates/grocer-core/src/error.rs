//! Error types for the grocer-core library.

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the grocer library.
#[derive(Error, Debug)]
pub enum GrocerError {
    /// Receipt field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Nothing to process at the requested location.
    #[error("No PDF files found in {}", location.display())]
    NoInputDocuments { location: PathBuf },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be read from disk.
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while pulling fields out of a single receipt.
///
/// Only `SourceUnavailable` fails a whole document. The other variants are
/// recovered where they occur and surface as warnings on the parse result.
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    /// The document's text could not be obtained.
    #[error("source {source_id} unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// No tier matched for a field.
    #[error("could not resolve {field}")]
    FieldUnresolved { field: &'static str },

    /// A date-shaped value failed calendar parsing.
    #[error("malformed date: {value}")]
    MalformedDate { value: String },

    /// A labeled total matched but was zero or could not be parsed.
    #[error("tier {tier} matched non-positive amount {value}")]
    NonPositiveAmount { tier: &'static str, value: String },

    /// Matched quantities were too large to add up.
    #[error("tier {tier} overflowed summing {count} quantities")]
    Overflow { tier: &'static str, count: usize },

    /// A rule pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ExtractionError {
    /// Amount parse failures share the non-positive path.
    pub(crate) fn unparsed_amount(tier: &'static str, raw: &str) -> Self {
        Self::NonPositiveAmount {
            tier,
            value: raw.to_string(),
        }
    }

    pub(crate) fn non_positive(tier: &'static str, value: Decimal) -> Self {
        Self::NonPositiveAmount {
            tier,
            value: value.to_string(),
        }
    }
}

/// Result type for the grocer library.
pub type Result<T> = std::result::Result<T, GrocerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn build_chain() -> Result<()> {
        let chain: std::result::Result<(), ExtractionError> =
            Err(ExtractionError::FieldUnresolved { field: "order_total" });
        chain?;
        Ok(())
    }

    #[test]
    fn test_extraction_errors_lift_into_grocer_error() {
        let err = build_chain().unwrap_err();
        assert!(matches!(err, GrocerError::Extraction(ExtractionError::FieldUnresolved { .. })));
        assert_eq!(err.to_string(), "extraction error: could not resolve order_total");
    }
}
