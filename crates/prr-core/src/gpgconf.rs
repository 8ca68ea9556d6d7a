//! Algorithm preferences in `gpg.conf`
//!
//! Replaces any `personal-*` preference lines with the list's recommended
//! cipher, digest and compression order.

use std::path::Path;

use prr_fs::{RobustnessConfig, io};
use tracing::info;

use crate::Result;

const PREFERENCE_PREFIX: &str = "personal-";

pub const PREFERENCES: [&str; 3] = [
    "personal-cipher-preferences AES256 CAMELLIA256 TWOFISH AES192 CAMELLIA192 AES CAMELLIA128 CAST5",
    "personal-digest-preferences SHA512 SHA384 SHA256 SHA224 RIPEMD160",
    "personal-compress-preferences BZIP2 ZIP ZLIB",
];

/// Drop blank and `personal-*` lines, trim the rest, then append the
/// recommended preferences.
pub fn rewrite_preferences(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 256);
    let kept = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(PREFERENCE_PREFIX));

    for line in kept.chain(PREFERENCES) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Rewrite `path` in place. A missing file is treated as empty and created.
/// A missing GnuPG home is created with owner-only access, which gpg
/// requires of its home directory.
///
/// Returns whether the file content changed.
pub fn apply_preferences(path: &Path, robustness: RobustnessConfig) -> Result<bool> {
    let current = io::read_text_or_empty(path)?;
    let updated = rewrite_preferences(&current);
    if updated == current {
        info!(path = %path.display(), "Preferences already current");
        return Ok(false);
    }

    if let Some(home) = path.parent()
        && !home.as_os_str().is_empty()
        && !home.exists()
    {
        io::create_private_dir(home)?;
    }
    io::write_atomic(path, updated.as_bytes(), robustness)?;
    info!(path = %path.display(), "Wrote algorithm preferences");
    Ok(true)
}
