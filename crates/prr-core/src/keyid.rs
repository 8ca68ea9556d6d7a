//! Public-key identifiers as they appear in rosters and rules

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

/// `0x` followed by sixteen hex digits, any case.
pub static KEY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^0x[A-F0-9]{16}$").unwrap());

/// Separator used in the rule store's `keyId` attribute.
pub const KEY_ID_SEPARATOR: &str = ", ";

/// A 64-bit OpenPGP key id written as `0x` plus sixteen hex digits.
///
/// The original spelling is kept for output; comparison ignores case.
#[derive(Debug, Clone, Eq)]
pub struct KeyIdentifier(String);

impl KeyIdentifier {
    /// Accept `token` if it matches the key id pattern.
    pub fn parse(token: &str) -> Option<Self> {
        Self::is_valid(token).then(|| Self(token.to_string()))
    }

    pub fn is_valid(token: &str) -> bool {
        KEY_ID_PATTERN.is_match(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for KeyIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for KeyIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
    }
}

impl FromStr for KeyIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidKeyId(s.to_string()))
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join ids the way the rule store expects them.
pub fn join_key_ids(ids: &[KeyIdentifier]) -> String {
    ids.iter()
        .map(KeyIdentifier::as_str)
        .collect::<Vec<_>>()
        .join(KEY_ID_SEPARATOR)
}
