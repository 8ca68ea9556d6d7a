//! Stages and results of a synchronization run

use std::fmt;
use std::path::PathBuf;

use crate::{Error, GovernedAddress, ImportReport, KeyIdentifier, Result};

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStage {
    Init,
    FetchingInputs,
    Importing,
    MergingRules,
    Done,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::FetchingInputs => write!(f, "fetching inputs"),
            Self::Importing => write!(f, "importing keys"),
            Self::MergingRules => write!(f, "merging rules"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// What a completed run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub address: GovernedAddress,
    /// Key ids placed in the governed rule, in descriptor order
    pub key_ids: Vec<KeyIdentifier>,
    pub rule_store: PathBuf,
    /// Number of rules in the store after the merge
    pub rules_total: usize,
    pub import: ImportReport,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum SyncOutcome {
    Done(SyncSummary),
    Aborted { stage: SyncStage, error: Error },
}

impl SyncOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Done(_) => None,
            Self::Aborted { error, .. } => Some(error),
        }
    }

    /// The stage the run stopped in, `Done` on success.
    pub fn stage(&self) -> SyncStage {
        match self {
            Self::Done(_) => SyncStage::Done,
            Self::Aborted { stage, .. } => *stage,
        }
    }

    pub fn into_result(self) -> Result<SyncSummary> {
        match self {
            Self::Done(summary) => Ok(summary),
            Self::Aborted { error, .. } => Err(error),
        }
    }
}
