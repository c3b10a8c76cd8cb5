//! Ordered fallback tiers for a single field.
//!
//! A [`RuleChain`] tries its rules in priority order and stops at the first
//! one that accepts a value. A rule can also reject what it found (a zero
//! total, an impossible date); the chain records the rejection and moves on
//! to the next tier.

use tracing::{debug, trace};

use super::{Document, ExtractionMatch};
use crate::error::ExtractionError;

/// One tier of a field's extraction strategy.
pub trait Rule<T> {
    /// Short identifier, reported with the accepted value.
    fn name(&self) -> &'static str;

    /// `Ok(Some)` accepts, `Ok(None)` means no match, `Err` rejects a match.
    fn apply(&self, doc: &Document<'_>) -> Result<Option<ExtractionMatch<T>>, ExtractionError>;
}

/// Result of running a chain over a document.
#[derive(Debug)]
pub struct ChainOutcome<T> {
    /// First accepted value, if any.
    pub value: Option<ExtractionMatch<T>>,
    /// Name of the rule that produced `value`.
    pub rule: Option<&'static str>,
    /// Matches rejected by earlier tiers.
    pub rejected: Vec<ExtractionError>,
}

impl<T> ChainOutcome<T> {
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }
}

/// Prioritized list of rules for one field.
pub struct RuleChain<T> {
    field: &'static str,
    rules: Vec<Box<dyn Rule<T> + Send + Sync>>,
}

impl<T> RuleChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    /// Append a rule with lower priority than those already added.
    pub fn with_rule(mut self, rule: impl Rule<T> + Send + Sync + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Run the tiers in order until one accepts.
    pub fn resolve(&self, doc: &Document<'_>) -> ChainOutcome<T> {
        let mut rejected = Vec::new();

        for rule in &self.rules {
            match rule.apply(doc) {
                Ok(Some(found)) => {
                    debug!("{}: accepted by tier '{}' from {:?}", self.field, rule.name(), found.source);
                    return ChainOutcome {
                        value: Some(found),
                        rule: Some(rule.name()),
                        rejected,
                    };
                }
                Ok(None) => trace!("{}: tier '{}' found nothing", self.field, rule.name()),
                Err(e) => {
                    debug!("{}: tier '{}' rejected: {}", self.field, rule.name(), e);
                    rejected.push(e);
                }
            }
        }

        ChainOutcome {
            value: None,
            rule: None,
            rejected,
        }
    }
}
