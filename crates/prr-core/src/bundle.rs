//! Key bundle fetching

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::fetch::Fetch;

/// Exportable public-key material, passed to the importer untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBundle(Vec<u8>);

impl KeyBundle {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for KeyBundle {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for KeyBundle {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

#[derive(Clone)]
pub struct KeyBundleSource {
    fetcher: Arc<dyn Fetch>,
}

impl KeyBundleSource {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    pub async fn fetch(&self, url: &str) -> Result<KeyBundle> {
        let bundle = KeyBundle(self.fetcher.fetch(url).await?);
        info!(bytes = bundle.len(), "Fetched key bundle");
        Ok(bundle)
    }
}
