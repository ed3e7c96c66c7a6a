//! Blocking `PublishedMetadata` adapter over the async client
//!
//! Owns a current-thread runtime, so it must not be used from inside
//! another tokio runtime.

use tokio::runtime::{Builder, Runtime};
use tracing::trace;

use stub_uploader_core::error::{StubError, StubResult};
use stub_uploader_core::provider::PublishedMetadata;

use crate::cache::MetadataCache;
use crate::client::PypiClient;
use crate::RegistryResult;

/// Cached, blocking view of the package index
#[derive(Debug)]
pub struct BlockingPypi {
    runtime: Runtime,
    client: PypiClient,
    cache: MetadataCache,
}

impl BlockingPypi {
    pub fn new(client: PypiClient, cache: MetadataCache) -> RegistryResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StubError::io("Failed to start the HTTP runtime".to_string(), e))?;
        Ok(Self {
            runtime,
            client,
            cache,
        })
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }
}

impl PublishedMetadata for BlockingPypi {
    fn runtime_requires(&self, distribution: &str) -> StubResult<Option<Vec<String>>> {
        if let Some(lookup) = self.cache.get(distribution) {
            trace!("Cache hit for {}", distribution);
            return Ok(lookup.into_requires_dist());
        }

        let lookup = self.runtime.block_on(self.client.lookup(distribution))?;
        self.cache.insert(distribution, lookup.clone());
        Ok(lookup.into_requires_dist())
    }
}
