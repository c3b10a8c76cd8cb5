//! Tiered receipt parser.
//!
//! Runs one [`RuleChain`] per field and folds the outcomes into a
//! [`DocumentRecord`]. Parsing itself never fails: a field no tier can
//! resolve becomes a sentinel and the reason lands in `warnings`.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::record::{DocumentRecord, Field, MetricKind};

use super::rules::{
    chain::{ChainOutcome, RuleChain},
    dates::date_chain,
    order::order_number_chain,
    Document,
};

/// Result of parsing one receipt.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: DocumentRecord,
    /// Which tier resolved each field.
    pub tiers: FieldTiers,
    /// Recoverable problems met along the way.
    pub warnings: Vec<ExtractionError>,
    /// Mean confidence over the three fields, unresolved ones counting zero.
    pub confidence: f32,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Name of the rule that produced each field, if any did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTiers {
    pub order_number: Option<&'static str>,
    pub order_date: Option<&'static str>,
    pub metric: Option<&'static str>,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt into a record.
    fn parse(&self, doc: &Document<'_>) -> ExtractionResult;

    /// Metric this parser fills in.
    fn metric_kind(&self) -> MetricKind;
}

/// Parser built from one rule chain per field.
pub struct TieredParser {
    kind: MetricKind,
    dates: RuleChain<NaiveDate>,
    order_numbers: RuleChain<String>,
    metric: RuleChain<Decimal>,
}

impl TieredParser {
    /// Standard date and order number chains plus a pipeline-specific
    /// metric chain.
    pub fn new(kind: MetricKind, metric: RuleChain<Decimal>) -> Self {
        Self {
            kind,
            dates: date_chain(),
            order_numbers: order_number_chain(),
            metric,
        }
    }
}

impl ReceiptParser for TieredParser {
    fn parse(&self, doc: &Document<'_>) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing {} from {} characters of text", doc.source_id(), doc.text.len());

        let order_number = self.order_numbers.resolve(doc);
        let order_date = self.dates.resolve(doc);
        let metric = self.metric.resolve(doc);

        let tiers = FieldTiers {
            order_number: order_number.rule,
            order_date: order_date.rule,
            metric: metric.rule,
        };
        let confidence =
            (confidence_of(&order_number) + confidence_of(&order_date) + confidence_of(&metric)) / 3.0;

        let order_number = settle(order_number, self.order_numbers.field(), &mut warnings);
        let order_date = settle(order_date, self.dates.field(), &mut warnings);
        let metric_value = match settle(metric, self.metric.field(), &mut warnings) {
            Field::Found(value) => value.max(Decimal::ZERO),
            Field::Unknown | Field::Error => Decimal::ZERO,
        };

        let record = DocumentRecord {
            source_id: doc.source_id(),
            order_number,
            order_date,
            metric: self.kind.with_value(metric_value),
        };

        debug!(
            "Extracted order {} dated {} with confidence {:.2} ({} warnings)",
            record.order_number,
            record.order_date,
            confidence,
            warnings.len()
        );

        ExtractionResult {
            record,
            tiers,
            warnings,
            confidence,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn metric_kind(&self) -> MetricKind {
        self.kind
    }
}

fn confidence_of<T>(outcome: &ChainOutcome<T>) -> f32 {
    outcome.value.as_ref().map_or(0.0, |m| m.confidence)
}

/// Turn a chain outcome into a field, moving diagnostics into `warnings`.
///
/// Rejected matches explain an unresolved field on their own; a plain
/// `FieldUnresolved` is only added when nothing matched at all.
fn settle<T>(outcome: ChainOutcome<T>, field: &'static str, warnings: &mut Vec<ExtractionError>) -> Field<T> {
    let resolved = outcome.value.is_some();
    if !resolved && outcome.rejected.is_empty() {
        warnings.push(ExtractionError::FieldUnresolved { field });
    }
    warnings.extend(outcome.rejected);
    outcome.value.map(|m| m.value).into()
}
