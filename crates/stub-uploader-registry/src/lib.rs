//! PyPI client for the stub uploader
//!
//! This crate fetches the published metadata of runtime distributions from
//! the PyPI JSON API, with retry logic and a TTL cache, and exposes it to
//! the verification engine through a blocking `PublishedMetadata` adapter.

pub mod api;
pub mod blocking;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{ProjectInfo, ProjectLookup, ProjectResponse};
pub use blocking::BlockingPypi;
pub use cache::{CacheEntry, CacheStats, MetadataCache};
pub use client::{PypiClient, RetryConfig, DEFAULT_INDEX_URL};

use stub_uploader_core::error::StubError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, StubError>;
