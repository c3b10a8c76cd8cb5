//! Rendering of run reports as text tables, JSON or CSV.

use std::fmt::Write as _;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;

use grocer_core::{CostSummary, DocumentRecord, QuantitySummary, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

const RULE_WIDTH: usize = 70;

/// Text rendering for a pipeline summary.
pub trait TextReport {
    /// Column heading for the per-record metric.
    fn metric_header(&self) -> &'static str;

    fn format_metric(&self, value: Decimal) -> String;

    fn write_summary(&self, out: &mut String) -> std::fmt::Result;
}

fn money(value: Decimal) -> String {
    format!("${:.2}", value)
}

impl TextReport for CostSummary {
    fn metric_header(&self) -> &'static str {
        "Cost ($)"
    }

    fn format_metric(&self, value: Decimal) -> String {
        money(value)
    }

    fn write_summary(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "DELIVERY COST ANALYSIS SUMMARY:")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Total number of orders analyzed: {}", self.order_count)?;
        writeln!(out, "Total cost of all orders: {}", money(self.total_cost))?;
        writeln!(out, "Average cost per delivery: {}", money(self.avg_cost_per_delivery))?;
        writeln!(
            out,
            "Average cost per basket (assuming {} baskets per order): {}",
            self.baskets_per_order.normalize(),
            money(self.avg_cost_per_basket)
        )?;

        if !self.monthly.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(out, "MONTHLY AVERAGES:")?;
            writeln!(out, "{:<10} {:<20} Orders", "Month", "Avg Cost/Delivery")?;
            writeln!(out, "{}", "-".repeat(40))?;
            for (month, bucket) in self.monthly.iter() {
                writeln!(
                    out,
                    "{:<10} {:<20} {}",
                    month.to_string(),
                    money(bucket.avg_metric()),
                    bucket.order_count
                )?;
            }
        }

        if let Some(peak) = &self.peak_month {
            writeln!(out)?;
            writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(
                out,
                "Month with highest average cost per delivery: {} ({})",
                peak.month,
                money(peak.value)
            )?;
        }

        writeln!(out, "{}", "=".repeat(RULE_WIDTH))
    }
}

impl TextReport for QuantitySummary {
    fn metric_header(&self) -> &'static str {
        "KG"
    }

    fn format_metric(&self, value: Decimal) -> String {
        format!("{:.3}", value)
    }

    fn write_summary(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(
            out,
            "Total KG purchased across all {} PDFs: {:.3} kg",
            self.order_count, self.total_weight_kg
        )?;
        writeln!(
            out,
            "Estimated items (at {}g each): {:.1}",
            self.avg_unit_weight_grams.normalize(),
            self.estimated_item_count
        )?;
        writeln!(out, "Items per order: {:.2}", self.items_per_order)?;
        writeln!(out, "Oldest order date: {}", self.oldest_order_date)?;

        if !self.monthly.is_empty() {
            writeln!(out)?;
            writeln!(out, "{:<10} {:<12} Orders", "Month", "KG")?;
            writeln!(out, "{}", "-".repeat(40))?;
            for (month, bucket) in self.monthly.iter() {
                writeln!(
                    out,
                    "{:<10} {:<12} {}",
                    month.to_string(),
                    format!("{:.3}", bucket.sum_metric),
                    bucket.order_count
                )?;
            }
        }

        if let Some(peak) = &self.peak_month {
            writeln!(out)?;
            writeln!(out, "Month with most KG purchased: {} ({:.3} kg)", peak.month, peak.value)?;
        }

        Ok(())
    }
}

/// Render a report in the requested format.
pub fn format_report<S>(report: &RunReport<S>, format: OutputFormat) -> anyhow::Result<String>
where
    S: Serialize + TextReport,
{
    match format {
        OutputFormat::Text => Ok(format_text(report)?),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        OutputFormat::Csv => format_csv(report),
    }
}

fn format_text<S: TextReport>(report: &RunReport<S>) -> Result<String, std::fmt::Error> {
    let summary = &report.summary;
    let mut out = String::new();

    writeln!(
        out,
        "{:<30} {:<15} {:<12} {}",
        "File",
        "Order #",
        "Date",
        summary.metric_header()
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for record in &report.records {
        write_row(&mut out, record, summary)?;
    }

    if report.failed > 0 {
        writeln!(out)?;
        writeln!(out, "{} receipt(s) could not be read", report.failed)?;
    }

    summary.write_summary(&mut out)?;
    Ok(out)
}

fn write_row<S: TextReport>(out: &mut String, record: &DocumentRecord, summary: &S) -> std::fmt::Result {
    writeln!(
        out,
        "{:<30} {:<15} {:<12} {}",
        record.source_id,
        record.order_number.to_string(),
        record.order_date.to_string(),
        summary.format_metric(record.metric.value())
    )
}

fn format_csv<S>(report: &RunReport<S>) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["file", "order_number", "order_date", report.metric.as_str()])?;

    for record in &report.records {
        writer.write_record([
            record.source_id.clone(),
            record.order_number.to_string(),
            record.order_date.to_string(),
            record.metric.value().to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
