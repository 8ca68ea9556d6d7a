//! Access to the workspace `test-fixtures/` directory.

use std::fs;
use std::path::PathBuf;

/// Path to the test-fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    // crates/prr-test-utils -> ../../test-fixtures
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// Read a fixture file relative to `test-fixtures/`.
///
/// # Panics
/// Panics if the file cannot be read.
pub fn read_fixture(relative: &str) -> String {
    let path = fixtures_dir().join(relative);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// A rule store with three rules, the second one for `{pgpnet@groups.io}`.
pub fn sample_rules() -> String {
    read_fixture("profile/pgprules.xml")
}

/// A roster with a `group pgpnet@groups.io=` line holding three valid ids.
pub fn sample_membership() -> String {
    read_fixture("sources/membership.txt")
}

pub fn sample_keys() -> String {
    read_fixture("sources/keys.asc")
}

/// The rule store after merging [`sample_membership`] into [`sample_rules`].
pub fn expected_rules() -> String {
    read_fixture("expected/pgprules.xml")
}

/// Key ids in [`sample_membership`], in order.
pub const SAMPLE_KEY_IDS: [&str; 3] = [
    "0xAAAAAAAAAAAAAAAA",
    "0xBBBBBBBBBBBBBBBB",
    "0xcccccccccccccccc",
];
