//! A single per-recipient rule
//!
//! Rules loaded from disk keep all of their attributes in document order so
//! that writing them back does not alter rules this tool does not own.

use std::fmt;

use crate::KeyIdentifier;
use crate::keyid::{KEY_ID_SEPARATOR, join_key_ids};

/// Attribute names used by `pgpRule` elements.
pub mod attr {
    pub const EMAIL: &str = "email";
    pub const KEY_ID: &str = "keyId";
    pub const ENCRYPT: &str = "encrypt";
    pub const SIGN: &str = "sign";
    pub const NEGATE_RULE: &str = "negateRule";
    pub const PGP_MIME: &str = "pgpMime";
}

/// Tri-state policy used for `encrypt`, `sign` and `pgpMime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Never,
    Maybe,
    Always,
}

impl Policy {
    pub fn as_attr(self) -> &'static str {
        match self {
            Self::Never => "0",
            Self::Maybe => "1",
            Self::Always => "2",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(Self::Never),
            "1" => Some(Self::Maybe),
            "2" => Some(Self::Always),
            _ => None,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Never => "never",
            Self::Maybe => "maybe",
            Self::Always => "always",
        };
        f.write_str(name)
    }
}

/// Policy attributes of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolicyFlags {
    pub encrypt: Policy,
    pub sign: Policy,
    pub negate_rule: bool,
    pub pgp_mime: Policy,
}

impl PolicyFlags {
    /// Always encrypt, always sign, always PGP/MIME.
    pub const ALWAYS: Self = Self {
        encrypt: Policy::Always,
        sign: Policy::Always,
        negate_rule: false,
        pgp_mime: Policy::Always,
    };
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self::ALWAYS
    }
}

/// One `pgpRule` element.
///
/// Invariant: an `email` attribute is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    attributes: Vec<(String, String)>,
}

impl Rule {
    /// Build the rule for a governed address.
    pub fn governed(email: &str, key_ids: &[KeyIdentifier], flags: PolicyFlags) -> Self {
        let attributes = vec![
            (attr::EMAIL.to_string(), email.to_string()),
            (attr::ENCRYPT.to_string(), flags.encrypt.as_attr().to_string()),
            (attr::SIGN.to_string(), flags.sign.as_attr().to_string()),
            (
                attr::NEGATE_RULE.to_string(),
                if flags.negate_rule { "1" } else { "0" }.to_string(),
            ),
            (attr::PGP_MIME.to_string(), flags.pgp_mime.as_attr().to_string()),
            (attr::KEY_ID.to_string(), join_key_ids(key_ids)),
        ];
        Self { attributes }
    }

    /// Wrap attributes read from a document; `None` without `email`.
    pub fn from_attributes(attributes: Vec<(String, String)>) -> Option<Self> {
        attributes
            .iter()
            .any(|(name, _)| name == attr::EMAIL)
            .then_some(Self { attributes })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn email(&self) -> &str {
        self.attribute(attr::EMAIL).unwrap_or_default()
    }

    /// Raw `keyId` attribute, empty when absent.
    pub fn key_ids(&self) -> &str {
        self.attribute(attr::KEY_ID).unwrap_or_default()
    }

    /// The individual entries of the `keyId` attribute.
    pub fn key_id_list(&self) -> Vec<&str> {
        self.key_ids()
            .split(KEY_ID_SEPARATOR.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Parsed policy attributes, `None` if any is missing or unrecognized.
    pub fn flags(&self) -> Option<PolicyFlags> {
        let negate_rule = match self.attribute(attr::NEGATE_RULE)?.trim() {
            "0" => false,
            "1" => true,
            _ => return None,
        };
        Some(PolicyFlags {
            encrypt: Policy::from_attr(self.attribute(attr::ENCRYPT)?)?,
            sign: Policy::from_attr(self.attribute(attr::SIGN)?)?,
            negate_rule,
            pgp_mime: Policy::from_attr(self.attribute(attr::PGP_MIME)?)?,
        })
    }

    pub fn matches(&self, email: &str) -> bool {
        self.email() == email
    }
}
