//! Declared metadata of one stub distribution.
//!
//! `MetadataRecord` is the stored schema (what a `METADATA.toml` contains);
//! `Metadata` binds a record to its distribution name, parses the declared
//! requirements and classifies them by name. Classification is syntactic:
//! whether a requirement is legitimate is decided by the verification rules.

use serde::{Deserialize, Serialize};

use super::naming::{strip_types_prefix, stub_distribution};
use super::requirement::Requirement;
use crate::error::{StubError, StubResult};
use crate::provider::KnownStubs;

/// Stored metadata schema for a stub distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Version of the stubs themselves (not of the runtime package)
    pub version: String,

    /// Raw PEP 508 requirement strings
    #[serde(default)]
    pub requires: Vec<String>,

    /// Lower bound on the interpreter version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<String>,

    /// Whether the publish driver uploads this distribution
    #[serde(default = "default_upload")]
    pub upload: bool,

    /// Runtime version from which the stubs are obsolete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsolete_since: Option<String>,

    /// The stubs are kept but no longer track the runtime package
    #[serde(default)]
    pub no_longer_updated: bool,

    /// The stubs cover only part of the runtime package
    #[serde(default)]
    pub partial_stub: bool,

    /// Source repository of the runtime package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_repository: Option<String>,
}

fn default_upload() -> bool {
    true
}

impl MetadataRecord {
    /// Create a record with the required version and no requirements
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            requires: Vec::new(),
            requires_python: None,
            upload: true,
            obsolete_since: None,
            no_longer_updated: false,
            partial_stub: false,
            upstream_repository: None,
        }
    }

    /// Add a requirement string
    pub fn with_requires(mut self, requirement: impl Into<String>) -> Self {
        self.requires.push(requirement.into());
        self
    }

    /// Set the interpreter constraint
    pub fn with_requires_python(mut self, requires_python: impl Into<String>) -> Self {
        self.requires_python = Some(requires_python.into());
        self
    }

    /// Mark the distribution as not uploaded
    pub fn without_upload(mut self) -> Self {
        self.upload = false;
        self
    }
}

/// Metadata of one stub distribution
#[derive(Debug, Clone)]
pub struct Metadata {
    distribution: String,
    record: MetadataRecord,
    requires: Vec<Requirement>,
}

impl Metadata {
    /// Bind a record to the runtime distribution it describes
    pub fn new(distribution: impl Into<String>, record: MetadataRecord) -> StubResult<Self> {
        let distribution = distribution.into();

        if distribution.trim().is_empty() {
            return Err(StubError::MetadataInvalid {
                distribution,
                reason: "distribution name is empty".to_string(),
            });
        }
        if strip_types_prefix(&distribution).is_some() {
            return Err(StubError::MetadataInvalid {
                reason: format!(
                    "distribution name must be the runtime name, not the stub name '{}'",
                    distribution
                ),
                distribution,
            });
        }

        let mut requires = Vec::with_capacity(record.requires.len());
        for raw in &record.requires {
            let req = Requirement::parse(raw).map_err(|e| StubError::MetadataInvalid {
                distribution: distribution.clone(),
                reason: e.to_string(),
            })?;
            requires.push(req);
        }

        Ok(Self {
            distribution,
            record,
            requires,
        })
    }

    /// Runtime distribution name
    pub fn distribution(&self) -> &str {
        &self.distribution
    }

    /// Name under which the stubs are published (`types-<distribution>`)
    pub fn stub_distribution(&self) -> String {
        stub_distribution(&self.distribution)
    }

    /// Version of the stubs
    pub fn version(&self) -> &str {
        &self.record.version
    }

    pub fn requires_python(&self) -> Option<&str> {
        self.record.requires_python.as_deref()
    }

    /// Whether the publish driver uploads this distribution
    pub fn upload(&self) -> bool {
        self.record.upload
    }

    pub fn obsolete_since(&self) -> Option<&str> {
        self.record.obsolete_since.as_deref()
    }

    pub fn no_longer_updated(&self) -> bool {
        self.record.no_longer_updated
    }

    /// The stored record
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    /// Every declared requirement, in declaration order
    pub fn unvalidated_requires(&self) -> &[Requirement] {
        &self.requires
    }

    /// Declared requirements that name a known stub distribution
    pub fn unvalidated_requires_typeshed(&self, known: &dyn KnownStubs) -> Vec<&Requirement> {
        self.requires
            .iter()
            .filter(|req| known.is_known_stub(req.canonical_name()))
            .collect()
    }

    /// Declared requirements that do not name a known stub distribution
    pub fn unvalidated_requires_external(&self, known: &dyn KnownStubs) -> Vec<&Requirement> {
        self.requires
            .iter()
            .filter(|req| !known.is_known_stub(req.canonical_name()))
            .collect()
    }
}
