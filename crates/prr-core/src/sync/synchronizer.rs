//! Pipeline driver

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::outcome::{SyncOutcome, SyncStage, SyncSummary};
use crate::fetch::{Fetch, HttpFetcher};
use crate::keyring::{GpgImporter, Import};
use crate::{
    Error, KeyBundleSource, KeyIdentifier, MembershipSource, Result, RuleStore, SyncSettings,
};

type ProgressFn = Box<dyn Fn(SyncStage) + Send + Sync>;

/// Runs one synchronization: fetch both inputs, import the key bundle, then
/// rewrite the governed rule.
///
/// Steps run in a fixed order with no retries. The first failure ends the
/// run; the importer is never called after a failed fetch and the rule store
/// is never touched after a failed import.
pub struct Synchronizer {
    settings: SyncSettings,
    fetcher: Arc<dyn Fetch>,
    importer: Arc<dyn Import>,
    progress: Option<ProgressFn>,
}

impl Synchronizer {
    /// Synchronizer with the HTTP fetcher and the configured gpg program.
    pub fn new(settings: SyncSettings) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(settings.http_timeout)?);
        let importer = Arc::new(GpgImporter::new(&settings.keyring_program));
        Ok(Self::with_parts(settings, fetcher, importer))
    }

    pub fn with_parts(
        settings: SyncSettings,
        fetcher: Arc<dyn Fetch>,
        importer: Arc<dyn Import>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            importer,
            progress: None,
        }
    }

    /// Call `progress` each time the run enters a stage.
    pub fn with_progress(mut self, progress: impl Fn(SyncStage) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub async fn run(&self) -> SyncOutcome {
        self.run_until(std::future::pending()).await
    }

    /// Run until done, or until `cancel` resolves.
    ///
    /// Cancellation is observed while fetching and while importing. A merge
    /// that has started always finishes.
    pub async fn run_until<F>(&self, cancel: F) -> SyncOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        self.enter(SyncStage::Init);
        info!(
            address = %self.settings.address,
            rule_store = %self.settings.rule_store.display(),
            "Starting synchronization"
        );

        self.enter(SyncStage::FetchingInputs);
        let fetched = tokio::select! {
            result = self.fetch_inputs() => result,
            () = &mut cancel => Err(Error::Cancelled),
        };
        let (key_ids, bundle) = match fetched {
            Ok(inputs) => inputs,
            Err(error) => return self.abort(SyncStage::FetchingInputs, error),
        };

        self.enter(SyncStage::Importing);
        let imported = tokio::select! {
            result = self.importer.import(&bundle) => result,
            () = &mut cancel => Err(Error::Cancelled),
        };
        let import = match imported {
            Ok(report) => report,
            Err(error) => return self.abort(SyncStage::Importing, error),
        };

        self.enter(SyncStage::MergingRules);
        let (rules_total, key_ids) = match self.merge(key_ids).await {
            Ok(merged) => merged,
            Err(error) => return self.abort(SyncStage::MergingRules, error),
        };

        self.enter(SyncStage::Done);
        info!(keys = key_ids.len(), rules_total, "Synchronization complete");
        SyncOutcome::Done(SyncSummary {
            address: self.settings.address.clone(),
            key_ids,
            rule_store: self.settings.rule_store.clone(),
            rules_total,
            import,
        })
    }

    async fn fetch_inputs(&self) -> Result<(Vec<KeyIdentifier>, crate::KeyBundle)> {
        let membership =
            MembershipSource::new(Arc::clone(&self.fetcher), self.settings.address.clone());
        let bundles = KeyBundleSource::new(Arc::clone(&self.fetcher));

        let (record, bundle) = tokio::try_join!(
            membership.fetch(&self.settings.membership_url),
            bundles.fetch(&self.settings.key_bundle_url),
        )?;
        Ok((record.into_key_ids(), bundle))
    }

    async fn merge(&self, key_ids: Vec<KeyIdentifier>) -> Result<(usize, Vec<KeyIdentifier>)> {
        let store = RuleStore::new(&self.settings.rule_store)
            .with_robustness(self.settings.robustness);
        let email = self.settings.address.rule_email();
        let flags = self.settings.flags;

        tokio::task::spawn_blocking(move || -> Result<_> {
            let merged = store.merge_rule(&email, &key_ids, flags)?;
            Ok((merged.len(), key_ids))
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }

    fn enter(&self, stage: SyncStage) {
        debug!(%stage, "Entering stage");
        if let Some(progress) = &self.progress {
            progress(stage);
        }
    }

    fn abort(&self, stage: SyncStage, error: Error) -> SyncOutcome {
        warn!(%stage, kind = %error.kind(), %error, "Synchronization aborted");
        SyncOutcome::Aborted { stage, error }
    }
}
