//! In-memory collaborators, used as fixtures and by embedders that already
//! hold their data in memory.

use std::collections::{BTreeMap, BTreeSet};

use super::{Allowlist, KnownStubs, MetadataStore, PublishedMetadata};
use crate::error::{StubError, StubResult};
use crate::types::{canonical_name, strip_types_prefix, Metadata, MetadataRecord};

/// Metadata store backed by a map of records
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, MetadataRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record of `distribution`
    pub fn insert(&mut self, distribution: impl Into<String>, record: MetadataRecord) {
        self.records.insert(distribution.into(), record);
    }

    /// Builder form of `insert`
    pub fn with(mut self, distribution: impl Into<String>, record: MetadataRecord) -> Self {
        self.insert(distribution, record);
        self
    }

    /// Key under which `distribution` is stored, matching canonically
    fn resolve(&self, distribution: &str) -> Option<&str> {
        if let Some((key, _)) = self.records.get_key_value(distribution) {
            return Some(key.as_str());
        }
        let wanted = canonical_name(distribution);
        self.records
            .keys()
            .find(|key| canonical_name(key) == wanted)
            .map(String::as_str)
    }
}

impl MetadataStore for MemoryStore {
    fn load(&self, distribution: &str) -> StubResult<Metadata> {
        let key = self
            .resolve(distribution)
            .ok_or_else(|| StubError::MetadataNotFound {
                distribution: distribution.to_string(),
            })?;
        Metadata::new(key, self.records[key].clone())
    }

    fn distributions(&self) -> StubResult<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

impl KnownStubs for MemoryStore {
    fn is_known_stub(&self, stub_name: &str) -> bool {
        strip_types_prefix(stub_name)
            .map(|distribution| self.resolve(distribution).is_some())
            .unwrap_or(false)
    }
}

/// Allowlist backed by a map from canonical stub name to allowed names
#[derive(Debug, Clone, Default)]
pub struct MemoryAllowlist {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `stub_name` to declare each of `names`
    pub fn allow<I, S>(mut self, stub_name: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries
            .entry(canonical_name(stub_name))
            .or_default()
            .extend(names.into_iter().map(|n| canonical_name(n.as_ref())));
        self
    }

    /// Number of stub distributions with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Allowlist for MemoryAllowlist {
    fn allowed(&self, stub_name: &str) -> BTreeSet<String> {
        self.entries
            .get(&canonical_name(stub_name))
            .cloned()
            .unwrap_or_default()
    }
}

/// Package index backed by a map from canonical name to `requires_dist`
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    projects: BTreeMap<String, Vec<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `distribution` as published with the given runtime requirements
    pub fn publish<I, S>(mut self, distribution: &str, requires_dist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects.insert(
            canonical_name(distribution),
            requires_dist.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl PublishedMetadata for MemoryIndex {
    fn runtime_requires(&self, distribution: &str) -> StubResult<Option<Vec<String>>> {
        Ok(self.projects.get(&canonical_name(distribution)).cloned())
    }
}
