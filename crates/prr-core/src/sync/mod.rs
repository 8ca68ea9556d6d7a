//! The synchronization pipeline
//!
//! This module provides:
//! - **outcome**: stages of a run and its terminal result
//! - **synchronizer**: fetch, import, then merge, aborting on the first failure

mod outcome;
mod synchronizer;

pub use outcome::{SyncOutcome, SyncStage, SyncSummary};
pub use synchronizer::Synchronizer;
