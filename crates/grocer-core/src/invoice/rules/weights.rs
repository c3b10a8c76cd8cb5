//! Product weight extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use regex::Regex;

use super::chain::{Rule, RuleChain};
use super::patterns::product_grams_regex;
use super::{Document, ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

const GRAMS_PER_KG: i64 = 1000;

const RULE_NAME: &str = "product-grams";

/// Gram quantities listed against a named product.
pub struct WeightExtractor {
    pattern: Regex,
}

impl WeightExtractor {
    pub fn new(label: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            pattern: product_grams_regex(label)?,
        })
    }

    /// Sum of every listed weight, in kilograms. `None` when the product
    /// never appears with a weight; an error when the sum overflows.
    pub fn total_kg(&self, text: &str) -> Result<Option<ExtractionMatch<Decimal>>, ExtractionError> {
        let matches = self.extract_all(text);
        if matches.is_empty() {
            return Ok(None);
        }

        let grams = matches
            .iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.value))
            .ok_or(ExtractionError::Overflow {
                tier: RULE_NAME,
                count: matches.len(),
            })?;
        let source = matches
            .iter()
            .map(|m| m.source.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        Ok(Some(ExtractionMatch::new(grams / Decimal::from(GRAMS_PER_KG), 0.9, source)))
    }
}

impl FieldExtractor for WeightExtractor {
    /// Weight in grams.
    type Output = ExtractionMatch<Decimal>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let grams = Decimal::from_str(&caps[2]).ok()?;
                Some(
                    ExtractionMatch::new(grams, 0.9, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

impl Rule<Decimal> for WeightExtractor {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<Decimal>>, ExtractionError> {
        self.total_kg(doc.text)
    }
}

pub fn weight_chain(label: &str) -> Result<RuleChain<Decimal>, ExtractionError> {
    Ok(RuleChain::new("item_weight_kg").with_rule(WeightExtractor::new(label)?))
}
