//! The rules command

use colored::Colorize;
use prr_core::{ConfigResolver, Rule, RuleStore};

use crate::error::Result;

/// List the rules in the store, one per line.
pub fn run_rules(resolver: &ConfigResolver) -> Result<()> {
    let path = resolver.rule_store()?;
    let rules = RuleStore::new(&path).load()?;

    println!("{} {} ({} rule(s))", "=>".blue().bold(), path.display(), rules.len());
    for rule in &rules {
        println!("   {}", describe(rule));
    }
    Ok(())
}

fn describe(rule: &Rule) -> String {
    let keys = rule.key_id_list().len();
    let policy = match rule.flags() {
        Some(flags) if flags.negate_rule => "negated".to_string(),
        Some(flags) => format!(
            "encrypt={} sign={} pgpMime={}",
            flags.encrypt, flags.sign, flags.pgp_mime
        ),
        None => "custom".to_string(),
    };
    format!("{}  {}  {} key(s)", rule.email().cyan(), policy, keys)
}
