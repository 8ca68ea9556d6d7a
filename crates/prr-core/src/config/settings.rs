//! Settings for a synchronization run and the on-disk config file

use std::path::PathBuf;
use std::time::Duration;

use prr_fs::RobustnessConfig;
use serde::{Deserialize, Serialize};

use crate::{GovernedAddress, PolicyFlags};

/// Published roster for the default list.
pub const DEFAULT_MEMBERSHIP_URL: &str =
    "https://www.dropbox.com/s/9abn35l2xqeqc04/PGPNET%40groups.io.txt?dl=1";

/// Published key bundle for the default list.
pub const DEFAULT_KEY_BUNDLE_URL: &str =
    "https://www.dropbox.com/s/2tu23r92h8taock/PGPNET%40groups.io.asc?dl=1";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "prr-sync";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub address: GovernedAddress,
    pub membership_url: String,
    pub key_bundle_url: String,
    /// Key-management executable used for the import
    pub keyring_program: PathBuf,
    /// The `pgprules.xml` file to rewrite
    pub rule_store: PathBuf,
    pub flags: PolicyFlags,
    pub robustness: RobustnessConfig,
    pub http_timeout: Duration,
}

impl SyncSettings {
    /// Settings for the default list with explicit local paths.
    pub fn new(keyring_program: impl Into<PathBuf>, rule_store: impl Into<PathBuf>) -> Self {
        Self {
            address: GovernedAddress::default(),
            membership_url: DEFAULT_MEMBERSHIP_URL.to_string(),
            key_bundle_url: DEFAULT_KEY_BUNDLE_URL.to_string(),
            keyring_program: keyring_program.into(),
            rule_store: rule_store.into(),
            flags: PolicyFlags::ALWAYS,
            robustness: RobustnessConfig::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_address(mut self, address: GovernedAddress) -> Self {
        self.address = address;
        self
    }

    pub fn with_sources(
        mut self,
        membership_url: impl Into<String>,
        key_bundle_url: impl Into<String>,
    ) -> Self {
        self.membership_url = membership_url.into();
        self.key_bundle_url = key_bundle_url.into();
        self
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }
}

/// Contents of `config.toml` (or `.json`/`.yaml`). Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub address: Option<String>,
    pub membership_url: Option<String>,
    pub key_bundle_url: Option<String>,
    pub gpg_program: Option<PathBuf>,
    pub rule_store: Option<PathBuf>,
    pub lock_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub address: Option<String>,
    pub membership_url: Option<String>,
    pub key_bundle_url: Option<String>,
    pub gpg_program: Option<PathBuf>,
    pub rule_store: Option<PathBuf>,
}
