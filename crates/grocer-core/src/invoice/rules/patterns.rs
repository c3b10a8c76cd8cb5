//! Common regex patterns for delivery receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Receipt file names look like ORDER-21459074-2025-01-05.pdf
    pub static ref FILENAME_DATE: Regex = Regex::new(
        r"ORDER-\d+-(\d{4}-\d{2}-\d{2})"
    ).unwrap();

    // "Delivery date: January 5, 2025"
    pub static ref DELIVERY_DATE: Regex = Regex::new(
        r"Delivery date: ([A-Za-z]+ \d+, \d{4})"
    ).unwrap();

    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"Order #(\d+)"
    ).unwrap();

    // Any money-looking token, with optional currency and thousands separators
    pub static ref MONEY_AMOUNT: Regex = Regex::new(
        r"\$?\s*(\d{1,3}(?:,\d{3})*\.\d{2})\b"
    ).unwrap();
}

/// Labeled total tiers, highest priority first.
///
/// Matching is case-insensitive, so the upper-case labels only differ from
/// their mixed-case twins when a caller builds a case-sensitive chain.
pub const TOTAL_TIERS: &[(&str, &str)] = &[
    ("total", r"Total\s*\$?\s*(\d+\.\d{2})"),
    ("total-upper", r"TOTAL\s*\$?\s*(\d+\.\d{2})"),
    ("amount-due", r"Amount Due\s*\$?\s*(\d+\.\d{2})"),
    ("amount-due-upper", r"AMOUNT DUE\s*\$?\s*(\d+\.\d{2})"),
    ("order-total", r"Order Total\s*\$?\s*(\d+\.\d{2})"),
    ("order-total-upper", r"ORDER TOTAL\s*\$?\s*(\d+\.\d{2})"),
    ("total-thousands", r"Total\s*\$?\s*(\d+,\d+\.\d{2})"),
];

/// Build the case-insensitive regex for a labeled total tier.
pub fn total_tier_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?im){}", pattern))
}

/// Build the regex that finds `<label> ... <n>g` spans for a product.
///
/// The span between label and weight is non-greedy and stays on one line.
pub fn product_grams_regex(label: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)({}.*?)(\d+(?:\.\d+)?)g", regex::escape(label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tiers_compile() {
        for (_, pattern) in TOTAL_TIERS {
            assert!(total_tier_regex(pattern).is_ok());
        }
    }

    #[test]
    fn test_product_label_is_escaped() {
        let re = product_grams_regex("Kale (curly)").unwrap();
        assert!(re.is_match("kale (curly) bunch 300g"));
        assert!(!re.is_match("Kale curly bunch 300g"));
    }

    #[test]
    fn test_filename_date_pattern() {
        let caps = FILENAME_DATE
            .captures("receipts/ORDER-21459074-2025-01-05.pdf")
            .unwrap();
        assert_eq!(&caps[1], "2025-01-05");
    }
}
