//! Delivery date extraction.
//!
//! The file name is checked first (`ORDER-<n>-YYYY-MM-DD`), then the
//! "Delivery date: January 5, 2025" line in the body.

use chrono::NaiveDate;

use super::chain::{Rule, RuleChain};
use super::patterns::{DELIVERY_DATE, FILENAME_DATE};
use super::{Document, ExtractionMatch};
use crate::error::ExtractionError;

const FILENAME_FORMAT: &str = "%Y-%m-%d";
const LONG_FORMAT: &str = "%B %d, %Y";

/// Date embedded in the receipt's file name.
pub struct FilenameDateRule;

impl Rule<NaiveDate> for FilenameDateRule {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<NaiveDate>>, ExtractionError> {
        let path = doc.path.to_string_lossy();
        let Some(caps) = FILENAME_DATE.captures(&path) else {
            return Ok(None);
        };

        let raw = &caps[1];
        NaiveDate::parse_from_str(raw, FILENAME_FORMAT)
            .map(|date| Some(ExtractionMatch::new(date, 0.99, raw)))
            .map_err(|_| ExtractionError::MalformedDate {
                value: raw.to_string(),
            })
    }
}

/// "Delivery date:" line in the receipt body. Only the first one counts.
pub struct DeliveryDateRule;

impl Rule<NaiveDate> for DeliveryDateRule {
    fn name(&self) -> &'static str {
        "delivery-date"
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<NaiveDate>>, ExtractionError> {
        let Some(caps) = DELIVERY_DATE.captures(doc.text) else {
            return Ok(None);
        };
        let Some(full_match) = caps.get(0) else {
            return Ok(None);
        };

        parse_long_date(&caps[1])
            .map(|date| {
                Some(
                    ExtractionMatch::new(date, 0.95, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .ok_or_else(|| ExtractionError::MalformedDate {
                value: caps[1].to_string(),
            })
    }
}

/// Parse "January 5, 2025" style dates. The month must be spelled out in
/// full; chrono alone would also take "Jan".
pub fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, LONG_FORMAT).ok()?;
    let month = s.split_whitespace().next()?;
    date.format("%B")
        .to_string()
        .eq_ignore_ascii_case(month)
        .then_some(date)
}

/// File name first, then body text.
pub fn date_chain() -> RuleChain<NaiveDate> {
    RuleChain::new("order_date")
        .with_rule(FilenameDateRule)
        .with_rule(DeliveryDateRule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_long_date() {
        assert_eq!(parse_long_date("January 5, 2025"), Some(ymd(2025, 1, 5)));
        assert_eq!(parse_long_date("December 24, 2024"), Some(ymd(2024, 12, 24)));
        assert_eq!(parse_long_date("Smarch 5, 2025"), None);
        assert_eq!(parse_long_date("February 30, 2025"), None);
    }

    #[test]
    fn test_abbreviated_month_rejected() {
        assert_eq!(parse_long_date("Jan 5, 2025"), None);
        assert_eq!(parse_long_date("Sept 5, 2025"), None);
        assert_eq!(parse_long_date("january 5, 2025"), Some(ymd(2025, 1, 5)));

        let path = Path::new("receipt.pdf");
        let outcome = date_chain().resolve(&Document::new(path, "Delivery date: Jan 5, 2025"));
        assert!(outcome.value.is_none());
        assert!(matches!(
            outcome.rejected.as_slice(),
            [ExtractionError::MalformedDate { value }] if value == "Jan 5, 2025"
        ));
    }

    #[test]
    fn test_filename_takes_precedence() {
        let path = Path::new("pdfs/ORDER-21459074-2025-01-05.pdf");
        let text = "Order #21459074\nDelivery date: March 1, 2025\n";
        let outcome = date_chain().resolve(&Document::new(path, text));

        assert_eq!(outcome.rule, Some("filename"));
        assert_eq!(outcome.value.unwrap().value, ymd(2025, 1, 5));
    }

    #[test]
    fn test_falls_back_to_body() {
        let path = Path::new("receipt.pdf");
        let text = "Delivery date: March 1, 2025";
        let outcome = date_chain().resolve(&Document::new(path, text));

        assert_eq!(outcome.rule, Some("delivery-date"));
        assert_eq!(outcome.value.unwrap().value, ymd(2025, 3, 1));
    }

    #[test]
    fn test_impossible_filename_date_falls_through() {
        let path = Path::new("ORDER-1-2025-02-30.pdf");
        let text = "Delivery date: February 28, 2025";
        let outcome = date_chain().resolve(&Document::new(path, text));

        assert_eq!(outcome.value.unwrap().value, ymd(2025, 2, 28));
        assert!(matches!(
            outcome.rejected.as_slice(),
            [ExtractionError::MalformedDate { .. }]
        ));
    }

    #[test]
    fn test_malformed_body_date_is_unresolved() {
        let path = Path::new("receipt.pdf");
        let text = "Delivery date: Smarch 5, 2025";
        let outcome = date_chain().resolve(&Document::new(path, text));

        assert!(outcome.value.is_none());
        assert_eq!(outcome.rejected.len(), 1);
    }
}
