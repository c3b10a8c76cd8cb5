//! Run-level metrics for the cost and quantity pipelines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::record::{DocumentRecord, Field};

use super::monthly::{MonthBucket, MonthlyBreakdown, PeakMonth, PeakTieBreak};
use super::ratio;

const GRAMS_PER_KG: i64 = 1000;

/// Spend across a run of receipts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub order_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_cost_per_delivery: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub baskets_per_order: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_baskets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_cost_per_basket: Decimal,
    pub monthly: MonthlyBreakdown,
    /// Month with the highest average cost per delivery.
    pub peak_month: Option<PeakMonth>,
}

/// Consumption of the tracked product across a run of receipts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitySummary {
    pub order_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_unit_weight_grams: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_item_count: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub items_per_order: Decimal,
    pub oldest_order_date: Field<NaiveDate>,
    pub monthly: MonthlyBreakdown,
    /// Month with the largest total weight.
    pub peak_month: Option<PeakMonth>,
}

/// Run totals saturate at `Decimal::MAX` rather than overflow.
fn total_metric(records: &[DocumentRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.metric.value()))
}

/// Reduce cost records. Every record counts toward the scalar totals; only
/// dated ones land in a month.
pub fn summarize_costs(
    records: &[DocumentRecord],
    baskets_per_order: Decimal,
    tie_break: PeakTieBreak,
) -> CostSummary {
    let order_count = records.len();
    let orders = Decimal::from(order_count);
    let total_cost = total_metric(records);
    let total_baskets = orders.saturating_mul(baskets_per_order);

    let monthly = MonthlyBreakdown::from_records(records);
    let peak_month = monthly.peak_by(MonthBucket::avg_metric, tie_break);

    CostSummary {
        order_count,
        total_cost,
        avg_cost_per_delivery: ratio(total_cost, orders),
        baskets_per_order,
        total_baskets,
        avg_cost_per_basket: ratio(total_cost, total_baskets),
        monthly,
        peak_month,
    }
}

/// Reduce weight records into item estimates.
pub fn summarize_quantities(
    records: &[DocumentRecord],
    avg_unit_weight_grams: Decimal,
    tie_break: PeakTieBreak,
) -> QuantitySummary {
    let order_count = records.len();
    let total_weight_kg = total_metric(records);
    let estimated_item_count = ratio(
        total_weight_kg.saturating_mul(Decimal::from(GRAMS_PER_KG)),
        avg_unit_weight_grams,
    );

    let oldest_order_date: Field<NaiveDate> = records
        .iter()
        .filter_map(|r| r.order_date.value().copied())
        .min()
        .into();

    let monthly = MonthlyBreakdown::from_records(records);
    let peak_month = monthly.peak_by(|bucket| bucket.sum_metric, tie_break);

    QuantitySummary {
        order_count,
        total_weight_kg,
        avg_unit_weight_grams,
        estimated_item_count,
        items_per_order: ratio(estimated_item_count, Decimal::from(order_count)),
        oldest_order_date,
        monthly,
        peak_month,
    }
}
