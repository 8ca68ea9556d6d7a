//! Settings resolution and environment discovery
//!
//! - **settings**: the resolved [`SyncSettings`] and the config file schema
//! - **resolver**: merges defaults, config file, overrides and discovery
//! - **discovery**: finds the gpg program, mail profile and `gpg.conf`

mod discovery;
mod resolver;
mod settings;

pub use discovery::{DEFAULT_PROFILE_SUFFIX, Environment, RULE_STORE_FILE, SystemEnvironment};
pub use resolver::ConfigResolver;
pub use settings::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigFile, DEFAULT_HTTP_TIMEOUT, DEFAULT_KEY_BUNDLE_URL,
    DEFAULT_MEMBERSHIP_URL, SettingsOverrides, SyncSettings,
};
