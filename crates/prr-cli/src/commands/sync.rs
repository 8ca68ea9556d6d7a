//! The sync command

use colored::Colorize;
use prr_core::{ConfigResolver, SyncOutcome, SyncStage, Synchronizer};

use crate::error::{CliError, Result};

/// Resolve settings and run one synchronization. Ctrl-C cancels.
pub fn run_sync(resolver: &ConfigResolver) -> Result<()> {
    let settings = resolver.resolve()?;
    let synchronizer = Synchronizer::new(settings)?.with_progress(print_stage);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(synchronizer.run_until(interrupted()));

    match outcome {
        SyncOutcome::Done(summary) => {
            println!(
                "{} Wrote {} key id(s) for {} to {} ({} rule(s) total)",
                "OK".green().bold(),
                summary.key_ids.len(),
                summary.address.to_string().cyan(),
                summary.rule_store.display(),
                summary.rules_total
            );
            Ok(())
        }
        SyncOutcome::Aborted { stage, error } => Err(CliError::Aborted {
            stage,
            source: error,
        }),
    }
}

fn print_stage(stage: SyncStage) {
    let message = match stage {
        SyncStage::FetchingInputs => "Fetching membership and key bundle...",
        SyncStage::Importing => "Importing keys...",
        SyncStage::MergingRules => "Updating rule store...",
        SyncStage::Init | SyncStage::Done => return,
    };
    println!("{} {}", "=>".blue().bold(), message);
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Cannot listen for Ctrl-C; the run cannot be interrupted");
        std::future::pending::<()>().await;
    }
}
