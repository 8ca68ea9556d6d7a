//! Command implementations for prr-cli

pub mod configure_gpg;
pub mod discover;
pub mod rules;
pub mod sync;

pub use configure_gpg::run_configure_gpg;
pub use discover::run_discover;
pub use rules::run_rules;
pub use sync::run_sync;
