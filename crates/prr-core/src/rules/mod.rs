//! Per-recipient rule store
//!
//! The rule store is Enigmail's `pgprules.xml`: a `pgpRuleList` root holding
//! `pgpRule` elements keyed by their `email` attribute. A merge replaces the
//! governed address's rule and keeps every other rule exactly as loaded.

mod document;
mod rule;
mod store;

pub use document::{ROOT_ELEMENT, RULE_ELEMENT, RuleList};
pub use rule::{Policy, PolicyFlags, Rule, attr};
pub use store::RuleStore;
