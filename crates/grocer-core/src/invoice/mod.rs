//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, FieldTiers, ReceiptParser, TieredParser};
pub use rules::{Document, ExtractionMatch, FieldExtractor, Rule, RuleChain};
