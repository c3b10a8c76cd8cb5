//! Data models for receipts, aggregation and configuration.

pub mod config;
pub mod record;

pub use config::GrocerConfig;
pub use record::{DocumentRecord, Field, Metric, MetricKind, YearMonth};
