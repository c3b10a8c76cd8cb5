//! Order total extraction.
//!
//! Labeled totals are tried in priority order and the last occurrence of a
//! label wins, since subtotal lines come before the grand total. When no
//! label yields a positive amount, the largest bare amount inside the
//! plausibility window is taken instead.

use rust_decimal::Decimal;
use std::str::FromStr;

use regex::Regex;

use super::chain::{Rule, RuleChain};
use super::patterns::{total_tier_regex, MONEY_AMOUNT, TOTAL_TIERS};
use super::{Document, ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;

/// Every money-looking token in a text.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in MONEY_AMOUNT.captures_iter(text) {
            let (Some(full_match), Some(amount)) = (caps.get(0), parse_amount(&caps[1])) else {
                continue;
            };
            results.push(
                ExtractionMatch::new(amount, 0.5, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        results
    }
}

/// A "Total"/"Amount Due"-style label followed by an amount.
pub struct LabeledTotalRule {
    name: &'static str,
    pattern: Regex,
}

impl LabeledTotalRule {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            name,
            pattern: total_tier_regex(pattern)?,
        })
    }
}

impl Rule<Decimal> for LabeledTotalRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<Decimal>>, ExtractionError> {
        let Some(caps) = self.pattern.captures_iter(doc.text).last() else {
            return Ok(None);
        };
        let Some(full_match) = caps.get(0) else {
            return Ok(None);
        };

        let raw = &caps[1];
        let amount = parse_amount(raw).ok_or_else(|| ExtractionError::unparsed_amount(self.name, raw))?;
        if amount <= Decimal::ZERO {
            return Err(ExtractionError::non_positive(self.name, amount));
        }

        Ok(Some(
            ExtractionMatch::new(amount, 0.95, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        ))
    }
}

/// Largest bare amount within `[min, max]`.
pub struct PlausibleAmountRule {
    min: Decimal,
    max: Decimal,
}

impl PlausibleAmountRule {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }
}

impl Rule<Decimal> for PlausibleAmountRule {
    fn name(&self) -> &'static str {
        "plausible-amount"
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<Decimal>>, ExtractionError> {
        Ok(AmountExtractor::new()
            .extract_all(doc.text)
            .into_iter()
            .filter(|m| m.value >= self.min && m.value <= self.max)
            .max_by(|a, b| a.value.cmp(&b.value)))
    }
}

/// Labeled tiers in priority order, then the plausibility scan.
pub fn total_chain(config: &ExtractionConfig) -> Result<RuleChain<Decimal>, ExtractionError> {
    let mut chain = RuleChain::new("total_cost");
    for &(name, pattern) in TOTAL_TIERS {
        chain = chain.with_rule(LabeledTotalRule::new(name, pattern)?);
    }
    Ok(chain.with_rule(PlausibleAmountRule::new(
        config.plausible_min,
        config.plausible_max,
    )))
}

/// Parse a dollar amount, dropping thousands separators.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn resolve(text: &str) -> (Option<Decimal>, Option<&'static str>, usize) {
        let chain = total_chain(&ExtractionConfig::default()).unwrap();
        let outcome = chain.resolve(&Document::new(Path::new("r.pdf"), text));
        (outcome.value.map(|m| m.value), outcome.rule, outcome.rejected.len())
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("45.50"), Some(dec("45.50")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12,345,678.90"), Some(dec("12345678.90")));
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_last_total_wins_over_subtotal() {
        let text = "Subtotal $10.00\nDelivery $0.00\nTotal $45.50";
        let (value, rule, _) = resolve(text);
        assert_eq!(value, Some(dec("45.50")));
        assert_eq!(rule, Some("total"));
    }

    #[test]
    fn test_zero_total_falls_to_next_tier() {
        let text = "Total $0.00\nAmount Due $52.10";
        let (value, rule, rejected) = resolve(text);
        assert_eq!(value, Some(dec("52.10")));
        assert_eq!(rule, Some("amount-due"));
        // "Total" and "TOTAL" both hit the zero line
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_thousands_separator_tier() {
        let (value, rule, _) = resolve("Grand Total $1,234.56");
        assert_eq!(value, Some(dec("1234.56")));
        assert_eq!(rule, Some("total-thousands"));
    }

    #[test]
    fn test_plausibility_fallback_rejects_large_amounts() {
        let text = "Carrots $5.00\nCSA share $199.99\nAnnual plan $350.00";
        let (value, rule, _) = resolve(text);
        assert_eq!(value, Some(dec("199.99")));
        assert_eq!(rule, Some("plausible-amount"));
    }

    #[test]
    fn test_plausibility_window_is_inclusive() {
        let rule = PlausibleAmountRule::new(dec("20"), dec("200"));
        let doc = Document::new(Path::new("r.pdf"), "$19.99 $20.00");
        assert_eq!(rule.apply(&doc).unwrap().unwrap().value, dec("20.00"));

        let doc = Document::new(Path::new("r.pdf"), "$200.00 $200.01");
        assert_eq!(rule.apply(&doc).unwrap().unwrap().value, dec("200.00"));
    }

    #[test]
    fn test_no_amounts() {
        let (value, rule, _) = resolve("Thanks for shopping with us!");
        assert_eq!(value, None);
        assert_eq!(rule, None);
    }

    #[test]
    fn test_extract_all_amounts() {
        let results = AmountExtractor::new().extract_all("Eggs $6.25, Bread 4.50, Box $1,020.00");
        let values: Vec<Decimal> = results.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec![dec("6.25"), dec("4.50"), dec("1020.00")]);
    }
}
