//! Filesystem layer for prr-sync
//!
//! Provides locked, atomic replacement of small documents and
//! format-agnostic config loading.

pub mod config;
pub mod error;
pub mod io;

pub use config::{ConfigFormat, load_config};
pub use error::{Error, Result};
pub use io::{FileLock, RobustnessConfig};
