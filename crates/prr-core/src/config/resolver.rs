//! Layered settings resolution
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. Config file (`--config`, else `<config_dir>/prr-sync/config.toml` if present)
//! 3. Command-line overrides
//! 4. Discovery, only for the program and rule store when still unset

use std::path::PathBuf;
use std::time::Duration;

use prr_fs::{RobustnessConfig, load_config};
use tracing::debug;

use super::discovery::{Environment, SystemEnvironment};
use super::settings::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigFile, DEFAULT_HTTP_TIMEOUT, DEFAULT_KEY_BUNDLE_URL,
    DEFAULT_MEMBERSHIP_URL, SettingsOverrides, SyncSettings,
};
use crate::{Error, GovernedAddress, PolicyFlags, Result};

/// Produces [`SyncSettings`] from the layered sources.
pub struct ConfigResolver {
    config_file: Option<PathBuf>,
    config_dir_override: Option<PathBuf>,
    overrides: SettingsOverrides,
    environment: Box<dyn Environment>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Resolver using the platform config directory and the process environment.
    pub fn new() -> Self {
        Self {
            config_file: None,
            config_dir_override: None,
            overrides: SettingsOverrides::default(),
            environment: Box::new(SystemEnvironment::from_process()),
        }
    }

    /// Load this file instead of the default one. It must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Look for `config.toml` in `dir` instead of the platform config directory.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir_override = Some(dir.into());
        self
    }

    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    fn default_config_path(&self) -> Option<PathBuf> {
        let dir = match &self.config_dir_override {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()?.join(CONFIG_DIR_NAME),
        };
        Some(dir.join(CONFIG_FILE_NAME))
    }

    /// The config file layer alone; empty when no file applies.
    pub fn load_file(&self) -> Result<ConfigFile> {
        if let Some(path) = &self.config_file {
            if !path.is_file() {
                return Err(Error::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            debug!(?path, "Loading config file");
            return Ok(load_config(path)?);
        }

        match self.default_config_path() {
            Some(path) if path.is_file() => {
                debug!(?path, "Loading default config file");
                Ok(load_config(&path)?)
            }
            path => {
                debug!(?path, "No config file found, using defaults");
                Ok(ConfigFile::default())
            }
        }
    }

    pub fn resolve(&self) -> Result<SyncSettings> {
        let file = self.load_file()?;
        let overrides = &self.overrides;
        let rule_store = self.rule_store_from(&file)?;

        let address = match overrides.address.as_ref().or(file.address.as_ref()) {
            Some(address) => GovernedAddress::new(address)?,
            None => GovernedAddress::default(),
        };

        let membership_url = overrides
            .membership_url
            .clone()
            .or(file.membership_url)
            .unwrap_or_else(|| DEFAULT_MEMBERSHIP_URL.to_string());
        let key_bundle_url = overrides
            .key_bundle_url
            .clone()
            .or(file.key_bundle_url)
            .unwrap_or_else(|| DEFAULT_KEY_BUNDLE_URL.to_string());

        let keyring_program = match overrides.gpg_program.clone().or(file.gpg_program) {
            Some(program) => program,
            None => self.environment.keyring_program()?,
        };

        let defaults = RobustnessConfig::default();
        let robustness = RobustnessConfig {
            lock_timeout: seconds("lock_timeout_secs", file.lock_timeout_secs)?
                .unwrap_or(defaults.lock_timeout),
            ..defaults
        };
        let http_timeout =
            seconds("http_timeout_secs", file.http_timeout_secs)?.unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let settings = SyncSettings {
            address,
            membership_url,
            key_bundle_url,
            keyring_program,
            rule_store,
            flags: PolicyFlags::ALWAYS,
            robustness,
            http_timeout,
        };
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    /// Only the rule store path, without resolving anything else.
    pub fn rule_store(&self) -> Result<PathBuf> {
        let file = self.load_file()?;
        self.rule_store_from(&file)
    }

    fn rule_store_from(&self, file: &ConfigFile) -> Result<PathBuf> {
        match self.overrides.rule_store.as_ref().or(file.rule_store.as_ref()) {
            Some(path) => Ok(path.clone()),
            None => self.environment.rule_store(),
        }
    }
}

fn seconds(key: &str, value: Option<u64>) -> Result<Option<Duration>> {
    match value {
        Some(0) => Err(Error::config(format!("{} must be greater than zero", key))),
        other => Ok(other.map(Duration::from_secs)),
    }
}
