//! Core library for auditing grocery delivery receipts.
//!
//! This crate provides:
//! - PDF text extraction
//! - Tiered field extraction (order number, delivery date, order total,
//!   product weight) with sentinel values for anything unresolved
//! - Run aggregation into spend and consumption summaries with monthly
//!   breakdowns

pub mod aggregate;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod pipeline;

pub use aggregate::{CostSummary, MonthBucket, MonthlyBreakdown, PeakMonth, QuantitySummary};
pub use error::{ExtractionError, GrocerError, PdfError, Result};
pub use invoice::{Document, ExtractionResult, ReceiptParser, TieredParser};
pub use models::{DocumentRecord, Field, GrocerConfig, Metric, MetricKind, YearMonth};
pub use pdf::{PdfExtractor, TextSource};
pub use pipeline::{
    collect_report, process_document, run_pipeline, CostPipeline, DocumentOutcome, Pipeline,
    QuantityPipeline, RunReport,
};
