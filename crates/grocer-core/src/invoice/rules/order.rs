//! Order number extraction.

use super::chain::{Rule, RuleChain};
use super::patterns::ORDER_NUMBER;
use super::{Document, ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Digit runs following "Order #".
pub struct OrderNumberExtractor;

impl FieldExtractor for OrderNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ORDER_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(caps[1].to_string(), 0.95, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// First "Order #" in the text.
pub struct OrderNumberRule;

impl Rule<String> for OrderNumberRule {
    fn name(&self) -> &'static str {
        "order-hash"
    }

    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<String>>, ExtractionError> {
        Ok(OrderNumberExtractor.extract(doc.text))
    }
}

pub fn order_number_chain() -> RuleChain<String> {
    RuleChain::new("order_number").with_rule(OrderNumberRule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_order_number_wins() {
        let text = "Order #21459074\nReplaces Order #100";
        let found = OrderNumberExtractor.extract(text).unwrap();
        assert_eq!(found.value, "21459074");
        assert_eq!(found.position, Some((0, 15)));
    }

    #[test]
    fn test_requires_digits() {
        assert!(OrderNumberExtractor.extract("Order #pending").is_none());
        assert!(OrderNumberExtractor.extract("order #123").is_none());
    }
}
