//! The mailing-list address a synchronization run governs

use std::fmt;

use crate::{Error, Result};

/// Address of the list whose roster is published upstream.
pub const DEFAULT_ADDRESS: &str = "pgpnet@groups.io";

/// A mailing-list mailbox such as `pgpnet@groups.io`.
///
/// The roster names it as `group <mailbox>=`; the rule store keys its rule
/// by `{<mailbox>}`, braces being the exact-match syntax there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GovernedAddress(String);

impl GovernedAddress {
    /// Accepts a bare mailbox or its braced rule-store form.
    pub fn new(address: impl AsRef<str>) -> Result<Self> {
        let trimmed = address.as_ref().trim();
        let bare = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(trimmed)
            .trim();

        if bare.is_empty() {
            return Err(Error::config("governed address is empty"));
        }
        if bare.contains(|c: char| c.is_whitespace() || matches!(c, '=' | '{' | '}')) {
            return Err(Error::config(format!(
                "governed address {:?} contains whitespace, '=' or braces",
                bare
            )));
        }
        Ok(Self(bare.to_string()))
    }

    pub fn mailbox(&self) -> &str {
        &self.0
    }

    /// Line prefix identifying this list in a membership descriptor.
    pub fn descriptor_prefix(&self) -> String {
        format!("group {}=", self.0)
    }

    /// Value of the `email` attribute of this list's rule.
    pub fn rule_email(&self) -> String {
        format!("{{{}}}", self.0)
    }
}

impl Default for GovernedAddress {
    fn default() -> Self {
        Self(DEFAULT_ADDRESS.to_string())
    }
}

impl fmt::Display for GovernedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
