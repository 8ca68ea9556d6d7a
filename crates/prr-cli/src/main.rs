//! prr-sync CLI
//!
//! Synchronizes a mailing list's per-recipient encryption rule with the
//! list's published key roster.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use prr_core::ConfigResolver;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut resolver = ConfigResolver::new().with_overrides(cli.overrides.into());
    if let Some(path) = cli.config {
        resolver = resolver.with_config_file(path);
    }

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => commands::run_sync(&resolver),
        Commands::Discover => commands::run_discover(&resolver),
        Commands::Rules => commands::run_rules(&resolver),
        Commands::ConfigureGpg { gpg_conf } => {
            commands::run_configure_gpg(&resolver, gpg_conf.as_deref())
        }
    }
}
