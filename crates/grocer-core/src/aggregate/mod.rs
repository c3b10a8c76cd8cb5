//! Run-level aggregation of receipt records.
//!
//! Everything here is a pure function of the records passed in.

mod monthly;
mod summary;

pub use monthly::{MonthBucket, MonthlyBreakdown, PeakMonth, PeakTieBreak};
pub use summary::{summarize_costs, summarize_quantities, CostSummary, QuantitySummary};

use rust_decimal::Decimal;

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}
