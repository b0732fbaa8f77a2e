//! Normalization rules and their persistence
//!
//! Rules pair a name and description with a template. The engine only needs
//! the template; storage is delegated to a [`RuleStore`] implementation so
//! callers can plug in their own persistence.

mod model;
mod rulebook;
mod store;

pub use model::{NewRule, NormalizationRule, RuleId, RuleUpdate};
pub use rulebook::{RuleBook, RuleBookError};
pub use store::{derive_pattern, InMemoryRuleStore, RuleError, RuleStore};
