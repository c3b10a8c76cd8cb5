//! Per-receipt records and the month keys used to bucket them.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Display text for a field no tier could resolve.
pub const UNKNOWN: &str = "Unknown";

/// Display text for a field lost to a document-level failure.
pub const ERROR: &str = "Error";

/// A best-effort field value, or the sentinel that stands in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Extracted value.
    Found(T),
    /// No tier produced a usable value.
    Unknown,
    /// The whole document failed before extraction.
    Error,
}

impl<T> Field<T> {
    /// The extracted value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Found(value) => Some(value),
            Field::Unknown | Field::Error => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Unknown, Field::Found)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Found(value) => fmt::Display::fmt(value, f),
            Field::Unknown => f.pad(UNKNOWN),
            Field::Error => f.pad(ERROR),
        }
    }
}

impl<T: fmt::Display> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The numeric fact a pipeline pulls out of each receipt.
///
/// A run only ever produces one variant, so a record carries exactly one of
/// total cost or item weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Order total in currency units.
    TotalCost(#[serde(with = "rust_decimal::serde::float")] Decimal),
    /// Summed weight of the tracked product, in kilograms.
    ItemWeightKg(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

impl Metric {
    pub fn value(&self) -> Decimal {
        match self {
            Metric::TotalCost(v) | Metric::ItemWeightKg(v) => *v,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::TotalCost(_) => MetricKind::TotalCost,
            Metric::ItemWeightKg(_) => MetricKind::ItemWeightKg,
        }
    }
}

/// Which metric a pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalCost,
    ItemWeightKg,
}

impl MetricKind {
    /// Wrap a raw value in this kind's metric.
    pub fn with_value(self, value: Decimal) -> Metric {
        match self {
            MetricKind::TotalCost => Metric::TotalCost(value),
            MetricKind::ItemWeightKg => Metric::ItemWeightKg(value),
        }
    }

    pub fn zero(self) -> Metric {
        self.with_value(Decimal::ZERO)
    }

    /// Field name used in serialized records.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::TotalCost => "total_cost",
            MetricKind::ItemWeightKg => "item_weight_kg",
        }
    }
}

/// One receipt's extracted facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRecord {
    /// File name of the receipt. Display identity only.
    pub source_id: String,

    /// Numeric order identifier.
    pub order_number: Field<String>,

    /// Delivery date.
    pub order_date: Field<NaiveDate>,

    /// Pipeline metric. Never negative.
    #[serde(flatten)]
    pub metric: Metric,
}

impl DocumentRecord {
    /// The record emitted when a document could not be read at all.
    pub fn failed(source_id: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            source_id: source_id.into(),
            order_number: Field::Error,
            order_date: Field::Error,
            metric: kind.zero(),
        }
    }

    /// Month bucket for this record, if its date is real.
    pub fn month(&self) -> Option<YearMonth> {
        self.order_date.value().map(|date| YearMonth::from(*date))
    }
}

/// Calendar month key, ordered chronologically and shown as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:04}-{:02}", self.year, self.month))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
