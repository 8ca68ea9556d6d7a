//! Locked load-merge-write of the rule store file

use std::path::{Path, PathBuf};

use prr_fs::{FileLock, RobustnessConfig, io};
use tracing::{debug, info, warn};

use super::document::RuleList;
use super::rule::{PolicyFlags, Rule};
use crate::{KeyIdentifier, Result};

/// The rule store file of one mail profile.
///
/// A merge holds an exclusive lock on `<file>.lock` from load to rename, and
/// the new document is written to a temporary file first, so a failed merge
/// leaves the previous file in place.
///
/// The empty `pgprules.xml.lock` stays in the profile directory after the
/// first merge; mail clients ignore it. A symlinked store is updated through
/// the link, and the rewritten file keeps the original's permissions.
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
    robustness: RobustnessConfig,
}

impl RuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current rules without modifying anything.
    pub fn load(&self) -> Result<RuleList> {
        let content = io::read_text(&self.path)?;
        RuleList::parse(&content, &self.path)
    }

    /// Replace every rule for `email` with one rule carrying `key_ids`,
    /// placed first. Returns the list that was written.
    pub fn merge_rule(
        &self,
        email: &str,
        key_ids: &[KeyIdentifier],
        flags: PolicyFlags,
    ) -> Result<RuleList> {
        if key_ids.is_empty() {
            warn!(email, "Merging a rule with no key ids");
        }

        let lock = FileLock::acquire(&self.path, self.robustness.lock_timeout)?;

        let current = RuleList::parse(&io::read_text(&self.path)?, &self.path)?;
        let replaced = current.iter().filter(|r| r.matches(email)).count();
        let merged = current.merged(Rule::governed(email, key_ids, flags));
        let bytes = merged.render(&self.path)?;

        io::write_locked(&lock, &bytes, self.robustness)?;
        drop(lock);

        debug!(replaced, kept = merged.len() - 1, "Rule list rebuilt");
        info!(
            path = %self.path.display(),
            email,
            keys = key_ids.len(),
            "Updated per-recipient rule"
        );
        Ok(merged)
    }
}
