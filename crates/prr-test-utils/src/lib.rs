//! Shared test utilities for the prr-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: paths and contents of the files under `test-fixtures/`
//! - [`profile`]: [`TestProfile`] builder for a scratch profile with local sources

pub mod fixtures;
pub mod profile;

pub use profile::{FakeGpg, TestProfile};
