//! Locating the key-management program and the mail profile
//!
//! Discovery only runs for values the config file and command line left
//! unset. It never writes anything.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Rule store file name inside a profile directory.
pub const RULE_STORE_FILE: &str = "pgprules.xml";

/// Suffix identifying the default profile directory.
pub const DEFAULT_PROFILE_SUFFIX: &str = ".default";

#[cfg(windows)]
const PROGRAM_NAMES: [&str; 2] = ["gpg2.exe", "gpg.exe"];
#[cfg(not(windows))]
const PROGRAM_NAMES: [&str; 2] = ["gpg2", "gpg"];

#[cfg(windows)]
const INSTALL_DIRS: [&str; 3] = [
    r"C:\Program Files (x86)\GnuPG\bin",
    r"C:\Program Files\GnuPG\bin",
    r"C:\Program Files (x86)\GNU\GnuPG",
];
#[cfg(not(windows))]
const INSTALL_DIRS: [&str; 0] = [];

/// Profile roots relative to the home directory, in preference order.
const HOME_PROFILE_ROOTS: [&str; 3] = [
    "Library/Thunderbird/Profiles",
    ".thunderbird",
    ".mozilla-thunderbird",
];

/// Source of machine-specific defaults.
pub trait Environment: Send + Sync {
    /// The key-management executable to run imports with.
    fn keyring_program(&self) -> Result<PathBuf>;

    /// The rule store of the default mail profile.
    fn rule_store(&self) -> Result<PathBuf>;

    /// The GnuPG options file.
    fn gpg_conf(&self) -> Result<PathBuf>;
}

/// Discovery against the real process environment.
///
/// Every input can be replaced, so tests point it at a scratch home.
#[derive(Debug, Clone, Default)]
pub struct SystemEnvironment {
    path_var: Option<OsString>,
    home: Option<PathBuf>,
    app_data: Option<PathBuf>,
    gnupg_home: Option<PathBuf>,
}

impl SystemEnvironment {
    pub fn from_process() -> Self {
        Self {
            path_var: env::var_os("PATH"),
            home: dirs::home_dir(),
            app_data: env::var_os("APPDATA").map(PathBuf::from),
            gnupg_home: env::var_os("GNUPGHOME").map(PathBuf::from),
        }
    }

    pub fn with_path_var(mut self, path_var: impl Into<OsString>) -> Self {
        self.path_var = Some(path_var.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_app_data(mut self, app_data: impl Into<PathBuf>) -> Self {
        self.app_data = Some(app_data.into());
        self
    }

    pub fn with_gnupg_home(mut self, gnupg_home: impl Into<PathBuf>) -> Self {
        self.gnupg_home = Some(gnupg_home.into());
        self
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .path_var
            .as_ref()
            .map(|value| env::split_paths(value).collect())
            .unwrap_or_default();
        dirs.extend(INSTALL_DIRS.iter().map(PathBuf::from));
        dirs
    }

    fn profile_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if cfg!(windows)
            && let Some(app_data) = &self.app_data
        {
            roots.push(app_data.join("Thunderbird").join("Profiles"));
        }
        if let Some(home) = &self.home {
            roots.extend(HOME_PROFILE_ROOTS.iter().map(|rel| home.join(rel)));
        }
        roots
    }
}

impl Environment for SystemEnvironment {
    fn keyring_program(&self) -> Result<PathBuf> {
        let dirs = self.search_dirs();
        for name in PROGRAM_NAMES {
            if let Some(found) = dirs.iter().map(|d| d.join(name)).find(|p| p.is_file()) {
                debug!(program = %found.display(), "Discovered key-management program");
                return Ok(found);
            }
        }
        Err(Error::config(format!(
            "none of {} found on PATH; set gpg_program or pass --gpg",
            PROGRAM_NAMES.join(", ")
        )))
    }

    fn rule_store(&self) -> Result<PathBuf> {
        let roots = self.profile_roots();
        let root = roots.iter().find(|r| r.is_dir()).ok_or_else(|| {
            let looked: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
            Error::config(format!(
                "no mail profile directory found (looked in: {})",
                looked.join(", ")
            ))
        })?;
        debug!(root = %root.display(), "Using profile root");

        let profile = default_profile(root)?;
        let store = profile.join(RULE_STORE_FILE);
        if !store.is_file() {
            return Err(Error::config(format!(
                "profile {} has no {}",
                profile.display(),
                RULE_STORE_FILE
            )));
        }
        debug!(rule_store = %store.display(), "Discovered rule store");
        Ok(store)
    }

    fn gpg_conf(&self) -> Result<PathBuf> {
        if let Some(gnupg_home) = &self.gnupg_home {
            return Ok(gnupg_home.join("gpg.conf"));
        }
        if cfg!(windows)
            && let Some(app_data) = &self.app_data
        {
            return Ok(app_data.join("GnuPG").join("gpg.conf"));
        }
        self.home
            .as_ref()
            .map(|home| home.join(".gnupg").join("gpg.conf"))
            .ok_or_else(|| Error::config("cannot determine the home directory"))
    }
}

/// The single `*.default` directory under `root`.
fn default_profile(root: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(root).map_err(|e| prr_fs::Error::io(root, e))?;

    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| prr_fs::Error::io(root, e))?;
        let is_default = entry
            .file_name()
            .to_string_lossy()
            .ends_with(DEFAULT_PROFILE_SUFFIX);
        if is_default && entry.path().is_dir() {
            profiles.push(entry.path());
        }
    }

    match profiles.as_slice() {
        [profile] => Ok(profile.clone()),
        [] => Err(Error::config(format!(
            "no *{} profile in {}",
            DEFAULT_PROFILE_SUFFIX,
            root.display()
        ))),
        _ => Err(Error::config(format!(
            "{} *{} profiles in {}; pass --rules to choose one",
            profiles.len(),
            DEFAULT_PROFILE_SUFFIX,
            root.display()
        ))),
    }
}
