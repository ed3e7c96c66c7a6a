//! Allowlist of vetted external dependencies
//!
//! A TOML document mapping each stub distribution to the external
//! distributions it may declare:
//!
//! ```toml
//! types-geopandas = ["pandas-stubs", "shapely"]
//! types-requests = ["urllib3"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::Utf8Path;
use tracing::debug;

use stub_uploader_core::error::StubError;
use stub_uploader_core::provider::Allowlist;
use stub_uploader_core::types::{canonical_name, strip_types_prefix};

use crate::document::parse_document;
use crate::ConfigResult;

/// Allowlist loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowlistFile {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AllowlistFile {
    /// Parse allowlist `content`; `file` names the source in errors
    pub fn parse(file: &str, content: &str) -> ConfigResult<Self> {
        let raw: BTreeMap<String, Vec<String>> = parse_document(file, content)?;

        let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (stub_name, allowed) in raw {
            if strip_types_prefix(&stub_name).is_none() {
                return Err(StubError::ConfigValidation {
                    field: stub_name,
                    reason: format!("allowlist keys must be stub distribution names starting with types- ({})", file),
                });
            }
            entries
                .entry(canonical_name(&stub_name))
                .or_default()
                .extend(allowed.iter().map(|name| canonical_name(name)));
        }

        Ok(Self { entries })
    }

    /// Read an allowlist file
    pub fn load(path: &Utf8Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StubError::io(format!("Failed to read {}", path), e))?;
        let allowlist = Self::parse(path.as_str(), &content)?;
        debug!("Loaded allowlist entries for {} stubs from {}", allowlist.len(), path);
        Ok(allowlist)
    }

    /// Number of stub distributions with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Allowlist for AllowlistFile {
    fn allowed(&self, stub_name: &str) -> BTreeSet<String> {
        self.entries
            .get(&canonical_name(stub_name))
            .cloned()
            .unwrap_or_default()
    }
}
