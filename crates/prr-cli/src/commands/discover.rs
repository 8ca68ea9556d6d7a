//! The discover command

use colored::Colorize;
use prr_core::ConfigResolver;

use crate::error::Result;

/// Print the fully resolved settings.
pub fn run_discover(resolver: &ConfigResolver) -> Result<()> {
    let settings = resolver.resolve()?;

    print_row("address", &settings.address.to_string());
    print_row("membership", &settings.membership_url);
    print_row("key bundle", &settings.key_bundle_url);
    print_row("gpg", &settings.keyring_program.display().to_string());
    print_row("rule store", &settings.rule_store.display().to_string());
    match resolver.environment().gpg_conf() {
        Ok(path) => print_row("gpg.conf", &path.display().to_string()),
        Err(e) => print_row("gpg.conf", &format!("{}", e).dimmed().to_string()),
    }
    Ok(())
}

fn print_row(label: &str, value: &str) {
    println!("{:>12}  {}", label.bold(), value);
}
