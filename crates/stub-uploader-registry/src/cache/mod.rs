//! Lookup caching with TTL support
//!
//! Entries are keyed by canonical project name, and a missing project is
//! cached like any other answer.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;

use stub_uploader_core::types::canonical_name;

use crate::api::ProjectLookup;

/// Default lifetime of a cached lookup
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached lookup
    pub lookup: ProjectLookup,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn with_ttl(lookup: ProjectLookup, ttl: Duration) -> Self {
        Self {
            lookup,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory lookup cache with TTL
#[derive(Debug)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MetadataCache {
    /// Create a cache with the default TTL (1 hour)
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached lookup if fresh
    pub fn get(&self, project: &str) -> Option<ProjectLookup> {
        let key = canonical_name(project);
        let fresh = self
            .cache
            .get(&key)
            .map(|entry| entry.is_fresh().then(|| entry.lookup.clone()))?;
        if fresh.is_none() {
            // Remove stale entry
            self.cache.remove(&key);
        }
        fresh
    }

    /// Store a lookup
    pub fn insert(&self, project: &str, lookup: ProjectLookup) {
        self.cache
            .insert(canonical_name(project), CacheEntry::with_ttl(lookup, self.ttl));
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let fresh_entries = self.cache.iter().filter(|entry| entry.is_fresh()).count();
        CacheStats {
            total_entries: self.cache.len(),
            fresh_entries,
            stale_entries: self.cache.len() - fresh_entries,
        }
    }

    /// Remove stale entries
    pub fn cleanup(&self) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.is_fresh());
        before - self.cache.len()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of fresh entries
    pub fresh_entries: usize,
    /// Number of stale entries
    pub stale_entries: usize,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
