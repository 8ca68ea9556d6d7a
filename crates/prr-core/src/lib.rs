//! Core synchronization layer for prr-sync
//!
//! Keeps a mail client's per-recipient rule for a mailing list in step with
//! the list's published key roster:
//!
//! - **Membership**: fetch the roster descriptor and extract key identifiers
//! - **Key bundle**: fetch the exportable public keys as opaque bytes
//! - **Keyring import**: feed the bundle to the key-management executable
//! - **Rule store**: replace the list's rule in `pgprules.xml`, keeping all others
//!
//! # Architecture
//!
//! ```text
//!                    prr-cli
//!                       |
//!                  Synchronizer
//!                       |
//!     +-----------+-----+------+-----------+
//!     |           |            |           |
//! Membership  KeyBundle   KeyringImporter RuleStore
//!     \           /                        |
//!       Fetcher                          prr-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use prr_core::{ConfigResolver, Synchronizer};
//!
//! async fn example() -> prr_core::Result<()> {
//!     let settings = ConfigResolver::new().resolve()?;
//!     let summary = Synchronizer::new(settings)?.run().await.into_result()?;
//!     println!("{} keys", summary.key_ids.len());
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod bundle;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gpgconf;
pub mod keyid;
pub mod keyring;
pub mod membership;
pub mod rules;
pub mod sync;

pub use address::GovernedAddress;
pub use bundle::{KeyBundle, KeyBundleSource};
pub use config::{
    ConfigFile, ConfigResolver, Environment, SettingsOverrides, SyncSettings, SystemEnvironment,
};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use keyid::KeyIdentifier;
pub use keyring::{GpgImporter, Import, ImportReport};
pub use membership::{MembershipRecord, MembershipSource};
pub use rules::{Policy, PolicyFlags, Rule, RuleList, RuleStore};
pub use sync::{SyncOutcome, SyncStage, SyncSummary, Synchronizer};
