//! List of stub distributions already uploaded from here
//!
//! One stub distribution name per line. Blank lines and `#` comments are
//! ignored and names are compared in canonical form. The list also covers
//! stubs that have since been removed from the checkout, which is why it
//! is kept separately from `stubs/`.

use std::collections::BTreeSet;
use std::fs;

use camino::Utf8Path;
use tracing::{debug, warn};

use stub_uploader_core::error::StubError;
use stub_uploader_core::provider::KnownStubs;
use stub_uploader_core::types::{canonical_name, strip_types_prefix};

use crate::ConfigResult;

/// Canonical names of uploaded stub distributions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedPackages {
    names: BTreeSet<String>,
}

impl UploadedPackages {
    /// Parse the contents of an uploaded-packages file
    pub fn parse(content: &str) -> Self {
        let mut names = BTreeSet::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            if strip_types_prefix(line).is_none() {
                warn!("Line {}: '{}' is not a stub distribution name", number + 1, line);
            }
            names.insert(canonical_name(line));
        }
        Self { names }
    }

    /// Read an uploaded-packages file
    pub fn load(path: &Utf8Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StubError::io(format!("Failed to read {}", path), e))?;
        let uploaded = Self::parse(&content);
        debug!("Loaded {} uploaded stub names from {}", uploaded.len(), path);
        Ok(uploaded)
    }

    pub fn contains(&self, stub_name: &str) -> bool {
        self.names.contains(&canonical_name(stub_name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical names, sorted
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl KnownStubs for UploadedPackages {
    fn is_known_stub(&self, stub_name: &str) -> bool {
        self.contains(stub_name)
    }
}
