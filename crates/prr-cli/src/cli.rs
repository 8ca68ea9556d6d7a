//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use prr_core::SettingsOverrides;

/// prr-sync - Keep a mailing list's encryption rule in step with its key roster
#[derive(Parser, Debug)]
#[command(name = "prr-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// The command to run; `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings that win over the config file and discovery.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideArgs {
    /// Membership descriptor URL or path
    #[arg(short = 'i', long = "idfile", global = true, value_name = "URL")]
    pub membership_url: Option<String>,

    /// Key bundle URL or path
    #[arg(short = 'k', long = "keyfile", global = true, value_name = "URL")]
    pub key_bundle_url: Option<String>,

    /// Key-management program to import with
    #[arg(long = "gpg", global = true, value_name = "PATH")]
    pub gpg_program: Option<PathBuf>,

    /// Rule store file (pgprules.xml)
    #[arg(long = "rules", global = true, value_name = "PATH")]
    pub rule_store: Option<PathBuf>,

    /// Mailing-list address whose rule is managed
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub address: Option<String>,
}

impl From<OverrideArgs> for SettingsOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            address: args.address,
            membership_url: args.membership_url,
            key_bundle_url: args.key_bundle_url,
            gpg_program: args.gpg_program,
            rule_store: args.rule_store,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch the roster, import its keys and rewrite the list's rule
    Sync,

    /// Show the settings that would be used, including discovered paths
    Discover,

    /// List the rules currently in the rule store
    Rules,

    /// Write the recommended algorithm preferences to gpg.conf
    ConfigureGpg {
        /// gpg.conf to rewrite instead of the discovered one
        #[arg(long, value_name = "FILE")]
        gpg_conf: Option<PathBuf>,
    },
}
