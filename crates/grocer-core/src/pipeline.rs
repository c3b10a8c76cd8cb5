//! Extraction + aggregation pipelines.
//!
//! Both pipelines read every receipt the same way and differ only in the
//! metric chain they parse with and the summary they reduce to.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{
    summarize_costs, summarize_quantities, CostSummary, PeakTieBreak, QuantitySummary,
};
use crate::error::ExtractionError;
use crate::invoice::rules::{source_id, total_chain, weight_chain, Document};
use crate::invoice::{ExtractionResult, ReceiptParser, TieredParser};
use crate::models::config::GrocerConfig;
use crate::models::record::{DocumentRecord, MetricKind};
use crate::pdf::{panic_message, TextSource};

/// A per-receipt extractor paired with a run-level reducer.
pub trait Pipeline {
    /// Run-level metrics this pipeline produces.
    type Summary: Serialize;

    /// Parser used for every receipt.
    fn parser(&self) -> &TieredParser;

    /// Reduce the run's records. Must be pure.
    fn summarize(&self, records: &[DocumentRecord]) -> Self::Summary;

    fn metric_kind(&self) -> MetricKind {
        self.parser().metric_kind()
    }
}

/// Order totals, reduced to spend per delivery, basket and month.
pub struct CostPipeline {
    parser: TieredParser,
    baskets_per_order: Decimal,
    tie_break: PeakTieBreak,
}

impl CostPipeline {
    pub fn new(config: &GrocerConfig) -> crate::Result<Self> {
        Ok(Self {
            parser: TieredParser::new(MetricKind::TotalCost, total_chain(&config.extraction)?),
            baskets_per_order: config.cost.baskets_per_order,
            tie_break: config.aggregation.peak_tie_break,
        })
    }
}

impl Pipeline for CostPipeline {
    type Summary = CostSummary;

    fn parser(&self) -> &TieredParser {
        &self.parser
    }

    fn summarize(&self, records: &[DocumentRecord]) -> CostSummary {
        summarize_costs(records, self.baskets_per_order, self.tie_break)
    }
}

/// Weight of one product, reduced to item estimates.
pub struct QuantityPipeline {
    parser: TieredParser,
    product_label: String,
    avg_unit_weight_grams: Decimal,
    tie_break: PeakTieBreak,
}

impl QuantityPipeline {
    pub fn new(config: &GrocerConfig) -> crate::Result<Self> {
        let label = config.extraction.product_label.clone();
        Ok(Self {
            parser: TieredParser::new(MetricKind::ItemWeightKg, weight_chain(&label)?),
            product_label: label,
            avg_unit_weight_grams: config.quantity.avg_unit_weight_grams,
            tie_break: config.aggregation.peak_tie_break,
        })
    }

    pub fn product_label(&self) -> &str {
        &self.product_label
    }
}

impl Pipeline for QuantityPipeline {
    type Summary = QuantitySummary;

    fn parser(&self) -> &TieredParser {
        &self.parser
    }

    fn summarize(&self, records: &[DocumentRecord]) -> QuantitySummary {
        summarize_quantities(records, self.avg_unit_weight_grams, self.tie_break)
    }
}

/// What happened to one receipt.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub source_id: String,
    pub result: Result<ExtractionResult, ExtractionError>,
}

impl DocumentOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The extracted record, or the all-sentinel record for a failed read.
    pub fn into_record(self, kind: MetricKind) -> DocumentRecord {
        match self.result {
            Ok(extraction) => extraction.record,
            Err(_) => DocumentRecord::failed(self.source_id, kind),
        }
    }
}

/// Read and parse one receipt. Read failures, and panics raised while
/// reading or parsing, are captured rather than returned.
pub fn process_document<P, S>(pipeline: &P, source: &S, path: &Path) -> DocumentOutcome
where
    P: Pipeline + ?Sized,
    S: TextSource + ?Sized,
{
    let source_id = source_id(path);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        source
            .read_text(path)
            .map(|text| pipeline.parser().parse(&Document::new(path, &text)))
            .map_err(|e| e.to_string())
    }))
    .unwrap_or_else(|payload| Err(format!("panicked: {}", panic_message(&*payload))))
    .map_err(|reason| ExtractionError::SourceUnavailable {
        source_id: source_id.clone(),
        reason,
    });

    if let Err(e) = &result {
        warn!("Error processing {}: {}", path.display(), e);
    }

    DocumentOutcome { source_id, result }
}

/// Records and summary for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<S> {
    pub metric: MetricKind,
    pub records: Vec<DocumentRecord>,
    pub summary: S,
    /// Receipts whose text could not be read.
    pub failed: usize,
}

/// Reduce already-processed outcomes into a report.
pub fn collect_report<P: Pipeline + ?Sized>(
    pipeline: &P,
    outcomes: Vec<DocumentOutcome>,
) -> RunReport<P::Summary> {
    let kind = pipeline.metric_kind();
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    let records: Vec<DocumentRecord> = outcomes.into_iter().map(|o| o.into_record(kind)).collect();
    let summary = pipeline.summarize(&records);

    RunReport {
        metric: kind,
        records,
        summary,
        failed,
    }
}

/// Process every path in order, then aggregate.
pub fn run_pipeline<P, S>(pipeline: &P, source: &S, paths: &[impl AsRef<Path>]) -> RunReport<P::Summary>
where
    P: Pipeline + ?Sized,
    S: TextSource + ?Sized,
{
    let outcomes: Vec<DocumentOutcome> = paths
        .iter()
        .map(|path| process_document(pipeline, source, path.as_ref()))
        .collect();

    let report = collect_report(pipeline, outcomes);
    info!(
        "Processed {} receipts ({} unreadable)",
        report.records.len(),
        report.failed
    );
    report
}
