//! Rule-based field extractors for delivery receipts.

pub mod amounts;
pub mod chain;
pub mod dates;
pub mod order;
pub mod patterns;
pub mod weights;

pub use amounts::{parse_amount, total_chain, AmountExtractor, LabeledTotalRule, PlausibleAmountRule};
pub use chain::{ChainOutcome, Rule, RuleChain};
pub use dates::{date_chain, parse_long_date, DeliveryDateRule, FilenameDateRule};
pub use order::{order_number_chain, OrderNumberExtractor, OrderNumberRule};
pub use patterns::*;
pub use weights::{weight_chain, WeightExtractor};

use std::path::Path;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract all occurrences of the field, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;

    /// First occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }
}

/// What every rule gets to look at: the receipt text and where it came from.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    /// Path of the receipt file; some vendors encode metadata in the name.
    pub path: &'a Path,
    /// Full extracted text.
    pub text: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(path: &'a Path, text: &'a str) -> Self {
        Self { path, text }
    }

    /// File name used as the record's display identity.
    pub fn source_id(&self) -> String {
        source_id(self.path)
    }
}

/// File name of a path, falling back to the whole path when it has none.
pub fn source_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
