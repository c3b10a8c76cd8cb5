//! Configuration structures for the receipt pipelines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::PeakTieBreak;

/// Main configuration for grocer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrocerConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Cost pipeline configuration.
    pub cost: CostConfig,

    /// Quantity pipeline configuration.
    pub quantity: QuantityConfig,

    /// Monthly aggregation configuration.
    pub aggregation: AggregationConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lower bound of the window a bare amount must fall in to be taken as
    /// an order total.
    #[serde(with = "rust_decimal::serde::float")]
    pub plausible_min: Decimal,

    /// Upper bound of that window.
    #[serde(with = "rust_decimal::serde::float")]
    pub plausible_max: Decimal,

    /// Line item whose weight the quantity pipeline sums.
    pub product_label: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            plausible_min: Decimal::new(20, 0),
            plausible_max: Decimal::new(200, 0),
            product_label: "Not So Pretty Carrots".to_string(),
        }
    }
}

/// Cost pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Average number of baskets per delivery.
    #[serde(with = "rust_decimal::serde::float")]
    pub baskets_per_order: Decimal,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            baskets_per_order: Decimal::new(25, 1),
        }
    }
}

/// Quantity pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityConfig {
    /// Average weight of one unit of the tracked product, in grams.
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_unit_weight_grams: Decimal,
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            avg_unit_weight_grams: Decimal::new(100, 0),
        }
    }
}

/// Monthly aggregation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Month reported as the peak when several share the top score.
    pub peak_tie_break: PeakTieBreak,
}

impl GrocerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            crate::GrocerError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::GrocerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would make the pipelines meaningless.
    pub fn validate(&self) -> crate::Result<()> {
        let extraction = &self.extraction;
        if extraction.plausible_min > extraction.plausible_max {
            return Err(crate::GrocerError::Config(format!(
                "plausible_min ({}) exceeds plausible_max ({})",
                extraction.plausible_min, extraction.plausible_max
            )));
        }
        if extraction.product_label.trim().is_empty() {
            return Err(crate::GrocerError::Config(
                "product_label must not be empty".to_string(),
            ));
        }
        if self.cost.baskets_per_order.is_sign_negative() {
            return Err(crate::GrocerError::Config(
                "baskets_per_order must not be negative".to_string(),
            ));
        }
        if self.quantity.avg_unit_weight_grams <= Decimal::ZERO {
            return Err(crate::GrocerError::Config(
                "avg_unit_weight_grams must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = GrocerConfig::default();
        assert_eq!(config.cost.baskets_per_order, Decimal::from_str("2.5").unwrap());
        assert_eq!(config.quantity.avg_unit_weight_grams, Decimal::from(100));
        assert_eq!(config.extraction.plausible_min, Decimal::from(20));
        assert_eq!(config.extraction.plausible_max, Decimal::from(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"cost": {"baskets_per_order": 3.0}}"#).unwrap();

        let config = GrocerConfig::from_file(&path).unwrap();
        assert_eq!(config.cost.baskets_per_order, Decimal::from(3));
        assert_eq!(config.extraction.product_label, "Not So Pretty Carrots");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = GrocerConfig::default();
        config.extraction.product_label = "Rainbow Beets".to_string();
        config.save(&path).unwrap();

        let reloaded = GrocerConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.extraction.product_label, "Rainbow Beets");
        assert_eq!(reloaded.cost.baskets_per_order, config.cost.baskets_per_order);
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut config = GrocerConfig::default();
        config.extraction.plausible_min = Decimal::from(300);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            GrocerConfig::from_file(&missing),
            Err(crate::GrocerError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        match GrocerConfig::from_file(&broken) {
            Err(crate::GrocerError::Config(msg)) => assert!(msg.contains("broken.json")),
            other => panic!("expected a config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_tie_break_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"aggregation": {"peak_tie_break": "latest"}}"#).unwrap();

        let config = GrocerConfig::from_file(&path).unwrap();
        assert_eq!(config.aggregation.peak_tie_break, PeakTieBreak::Latest);
        assert_eq!(GrocerConfig::default().aggregation.peak_tie_break, PeakTieBreak::Earliest);
    }
}
