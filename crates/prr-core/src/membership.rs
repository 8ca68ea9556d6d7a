//! Membership descriptor fetching and parsing
//!
//! The descriptor is a line-oriented text file. Exactly one line must start
//! with `group <address>=`; the rest of that line lists the members' key ids
//! separated by whitespace. Everything else in the file is ignored.

use std::sync::Arc;

use tracing::{debug, info};

use crate::fetch::Fetch;
use crate::{Error, GovernedAddress, KeyIdentifier, Result};

/// The key ids currently listed for a governed address, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    address: GovernedAddress,
    key_ids: Vec<KeyIdentifier>,
}

impl MembershipRecord {
    /// Parse a descriptor for `address`.
    ///
    /// Tokens that are not key ids are dropped. Duplicates are kept.
    pub fn parse(address: &GovernedAddress, descriptor: &str) -> Result<Self> {
        let prefix = address.descriptor_prefix();
        let matching: Vec<&str> = descriptor
            .lines()
            .filter(|line| line.starts_with(&prefix))
            .collect();

        let [line] = matching.as_slice() else {
            return Err(Error::MembershipFormat {
                address: address.mailbox().to_string(),
                found: matching.len(),
            });
        };

        let mut key_ids = Vec::new();
        for token in line[prefix.len()..].split_whitespace() {
            match KeyIdentifier::parse(token) {
                Some(id) => key_ids.push(id),
                None => debug!(token, "Dropping token that is not a key id"),
            }
        }

        Ok(Self {
            address: address.clone(),
            key_ids,
        })
    }

    pub fn address(&self) -> &GovernedAddress {
        &self.address
    }

    pub fn key_ids(&self) -> &[KeyIdentifier] {
        &self.key_ids
    }

    pub fn into_key_ids(self) -> Vec<KeyIdentifier> {
        self.key_ids
    }

    pub fn len(&self) -> usize {
        self.key_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_ids.is_empty()
    }
}

/// Fetches and parses the roster for one governed address.
#[derive(Clone)]
pub struct MembershipSource {
    fetcher: Arc<dyn Fetch>,
    address: GovernedAddress,
}

impl MembershipSource {
    pub fn new(fetcher: Arc<dyn Fetch>, address: GovernedAddress) -> Self {
        Self { fetcher, address }
    }

    pub async fn fetch(&self, url: &str) -> Result<MembershipRecord> {
        let body = self.fetcher.fetch(url).await?;
        let text = String::from_utf8_lossy(&body);
        let record = MembershipRecord::parse(&self.address, &text)?;
        info!(
            address = %self.address,
            members = record.len(),
            "Fetched membership"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pgpnet() -> GovernedAddress {
        GovernedAddress::new("pgpnet@groups.io").unwrap()
    }

    fn ids(record: &MembershipRecord) -> Vec<&str> {
        record.key_ids().iter().map(KeyIdentifier::as_str).collect()
    }

    #[test]
    fn test_drops_invalid_tokens_in_order() {
        let descriptor =
            "group pgpnet@groups.io=0xAAAAAAAAAAAAAAAA 0xBBBBBBBBBBBBBBBB invalidid\n";
        let record = MembershipRecord::parse(&pgpnet(), descriptor).unwrap();
        assert_eq!(ids(&record), vec!["0xAAAAAAAAAAAAAAAA", "0xBBBBBBBBBBBBBBBB"]);
    }

    #[test]
    fn test_ignores_other_lines() {
        let descriptor = "\
# PGPNET membership
group other@groups.io=0x1111111111111111
group pgpnet@groups.io= 0xCCCCCCCCCCCCCCCC\t0xDDDDDDDDDDDDDDDD  \r
trailer
";
        let record = MembershipRecord::parse(&pgpnet(), descriptor).unwrap();
        assert_eq!(ids(&record), vec!["0xCCCCCCCCCCCCCCCC", "0xDDDDDDDDDDDDDDDD"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let descriptor = "group pgpnet@groups.io=0xAAAAAAAAAAAAAAAA 0xaaaaaaaaaaaaaaaa";
        let record = MembershipRecord::parse(&pgpnet(), descriptor).unwrap();
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_empty_member_list_is_not_an_error() {
        let record = MembershipRecord::parse(&pgpnet(), "group pgpnet@groups.io=\n").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_missing_line_is_format_error() {
        let err = MembershipRecord::parse(&pgpnet(), "group other@groups.io=0xAAAAAAAAAAAAAAAA")
            .unwrap_err();
        assert!(matches!(err, Error::MembershipFormat { found: 0, .. }));
    }

    #[test]
    fn test_duplicate_line_is_format_error() {
        let descriptor = "group pgpnet@groups.io=0xAAAAAAAAAAAAAAAA\ngroup pgpnet@groups.io=\n";
        let err = MembershipRecord::parse(&pgpnet(), descriptor).unwrap_err();
        assert!(matches!(err, Error::MembershipFormat { found: 2, .. }));
    }

    #[test]
    fn test_prefix_must_start_the_line() {
        let descriptor = " group pgpnet@groups.io=0xAAAAAAAAAAAAAAAA";
        let err = MembershipRecord::parse(&pgpnet(), descriptor).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }
}
