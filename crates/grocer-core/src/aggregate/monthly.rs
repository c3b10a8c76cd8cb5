//! Per-month buckets of record metrics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::record::{DocumentRecord, YearMonth};

use super::ratio;

/// Orders and metric total for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthBucket {
    pub order_count: usize,
    pub sum_metric: Decimal,
}

impl MonthBucket {
    /// Mean metric per order, zero for an empty bucket.
    pub fn avg_metric(&self) -> Decimal {
        ratio(self.sum_metric, Decimal::from(self.order_count))
    }
}

/// Which month wins when several share the peak score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakTieBreak {
    #[default]
    Earliest,
    Latest,
}

/// The month that scored highest under some measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakMonth {
    pub month: YearMonth,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// Records grouped by the month of their order date.
///
/// Records with a sentinel date are left out entirely. Months iterate in
/// ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyBreakdown {
    buckets: BTreeMap<YearMonth, MonthBucket>,
}

impl MonthlyBreakdown {
    pub fn from_records(records: &[DocumentRecord]) -> Self {
        let mut buckets: BTreeMap<YearMonth, MonthBucket> = BTreeMap::new();

        for record in records {
            let Some(month) = record.month() else {
                continue;
            };
            let bucket = buckets.entry(month).or_default();
            bucket.order_count += 1;
            bucket.sum_metric = bucket.sum_metric.saturating_add(record.metric.value());
        }

        Self { buckets }
    }

    pub fn get(&self, month: &YearMonth) -> Option<&MonthBucket> {
        self.buckets.get(month)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearMonth, &MonthBucket)> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Month with the highest `score`; `tie_break` picks among equal scores.
    pub fn peak_by(
        &self,
        score: impl Fn(&MonthBucket) -> Decimal,
        tie_break: PeakTieBreak,
    ) -> Option<PeakMonth> {
        let mut peak: Option<PeakMonth> = None;

        for (month, bucket) in &self.buckets {
            let value = score(bucket);
            let wins = match (peak, tie_break) {
                (None, _) => true,
                (Some(p), PeakTieBreak::Earliest) => value > p.value,
                (Some(p), PeakTieBreak::Latest) => value >= p.value,
            };
            if wins {
                peak = Some(PeakMonth {
                    month: *month,
                    value,
                });
            }
        }

        peak
    }
}

#[derive(Serialize)]
struct MonthRow {
    month: YearMonth,
    order_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    sum_metric: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    avg_metric: Decimal,
}

impl Serialize for MonthlyBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.buckets.iter().map(|(month, bucket)| MonthRow {
            month: *month,
            order_count: bucket.order_count,
            sum_metric: bucket.sum_metric,
            avg_metric: bucket.avg_metric(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Field, Metric};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(date: Option<(i32, u32, u32)>, cost: &str) -> DocumentRecord {
        DocumentRecord {
            source_id: "r.pdf".to_string(),
            order_number: Field::Unknown,
            order_date: date
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
                .into(),
            metric: Metric::TotalCost(Decimal::from_str(cost).unwrap()),
        }
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth { year, month }
    }

    #[test]
    fn test_groups_by_month() {
        let records = vec![
            record(Some((2025, 1, 5)), "40.00"),
            record(Some((2025, 1, 19)), "60.00"),
            record(Some((2024, 12, 22)), "55.00"),
            record(None, "99.00"),
        ];
        let monthly = MonthlyBreakdown::from_records(&records);

        assert_eq!(monthly.len(), 2);
        let jan = monthly.get(&ym(2025, 1)).unwrap();
        assert_eq!(jan.order_count, 2);
        assert_eq!(jan.avg_metric(), Decimal::from(50));

        let months: Vec<String> = monthly.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(months, vec!["2024-12", "2025-01"]);
    }

    #[test]
    fn test_peak_ties_go_to_earliest_month() {
        let records = vec![
            record(Some((2025, 3, 1)), "50.00"),
            record(Some((2025, 1, 1)), "50.00"),
            record(Some((2025, 2, 1)), "20.00"),
        ];
        let peak = MonthlyBreakdown::from_records(&records)
            .peak_by(MonthBucket::avg_metric, PeakTieBreak::Earliest)
            .unwrap();

        assert_eq!(peak.month, ym(2025, 1));
        assert_eq!(peak.value, Decimal::from(50));
    }

    #[test]
    fn test_peak_ties_can_go_to_latest_month() {
        let records = vec![
            record(Some((2025, 3, 1)), "50.00"),
            record(Some((2025, 1, 1)), "50.00"),
        ];
        let peak = MonthlyBreakdown::from_records(&records)
            .peak_by(MonthBucket::avg_metric, PeakTieBreak::Latest)
            .unwrap();

        assert_eq!(peak.month, ym(2025, 3));
    }

    #[test]
    fn test_empty_breakdown_has_no_peak() {
        let monthly = MonthlyBreakdown::from_records(&[record(None, "10.00")]);
        assert!(monthly.is_empty());
        assert!(monthly.peak_by(|b| b.sum_metric, PeakTieBreak::Earliest).is_none());
    }

    #[test]
    fn test_empty_bucket_average_is_zero() {
        assert_eq!(MonthBucket::default().avg_metric(), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_rows_in_order() {
        let records = vec![
            record(Some((2025, 2, 1)), "30.00"),
            record(Some((2025, 1, 1)), "10.00"),
        ];
        let json = serde_json::to_value(MonthlyBreakdown::from_records(&records)).unwrap();

        assert_eq!(json[0]["month"], "2025-01");
        assert_eq!(json[1]["order_count"], 1);
        assert_eq!(json[1]["avg_metric"], 30.0);
    }
}
