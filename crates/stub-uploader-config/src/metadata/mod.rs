//! Typeshed checkout as a metadata store
//!
//! Each third-party distribution lives in `stubs/<distribution>/` with its
//! declared metadata in `METADATA.toml`. Lookups first try the directory
//! name as given, then fall back to matching PEP 503 canonical names, so
//! `PyYAML`, `pyyaml` and `py_yaml`-style spellings all reach the same
//! directory when only one exists.
//!
//! `stubs/` is listed once, on first use; distributions added to the
//! checkout afterwards are not seen by the same `TypeshedDir`.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use stub_uploader_core::error::{StubError, StubResult};
use stub_uploader_core::provider::{KnownStubs, MetadataStore};
use stub_uploader_core::types::{canonical_name, strip_types_prefix, Metadata, MetadataRecord};

use crate::document::{check_syntax, line_column};
use crate::ConfigResult;

/// Directory of third-party stubs inside a typeshed checkout
pub const STUBS_DIR: &str = "stubs";

/// Per-distribution metadata file
pub const METADATA_FILE: &str = "METADATA.toml";

/// A typeshed checkout on disk
#[derive(Debug, Clone)]
pub struct TypeshedDir {
    root: Utf8PathBuf,
    listing: OnceCell<Vec<String>>,
}

impl TypeshedDir {
    /// Open a checkout; fails when `root` has no `stubs/` directory
    pub fn open(root: impl Into<Utf8PathBuf>) -> ConfigResult<Self> {
        let root = root.into();
        if !root.join(STUBS_DIR).is_dir() {
            return Err(StubError::ConfigValidation {
                field: "typeshed_dir".to_string(),
                reason: format!("{} is not a typeshed checkout (no {}/ directory)", root, STUBS_DIR),
            });
        }
        debug!("Using typeshed checkout at {}", root);
        Ok(Self {
            root,
            listing: OnceCell::new(),
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn stubs_dir(&self) -> Utf8PathBuf {
        self.root.join(STUBS_DIR)
    }

    /// Path of the metadata file of `distribution`, spelled as given
    pub fn metadata_path(&self, distribution: &str) -> Utf8PathBuf {
        self.stubs_dir().join(distribution).join(METADATA_FILE)
    }

    /// Directory name under `stubs/` that holds `distribution`
    fn resolve(&self, distribution: &str) -> ConfigResult<Option<String>> {
        if !is_plain_name(distribution) {
            return Ok(None);
        }
        let names = self.listing()?;
        if names.iter().any(|name| name == distribution) {
            return Ok(Some(distribution.to_string()));
        }

        let wanted = canonical_name(distribution);
        Ok(names.iter().find(|name| canonical_name(name) == wanted).cloned())
    }

    /// Sorted directory names under `stubs/`, read on first call
    fn listing(&self) -> ConfigResult<&[String]> {
        self.listing
            .get_or_try_init(|| self.read_listing())
            .map(Vec::as_slice)
    }

    fn read_listing(&self) -> ConfigResult<Vec<String>> {
        let stubs = self.stubs_dir();
        let entries = fs::read_dir(&stubs)
            .map_err(|e| StubError::io(format!("Failed to list {}", stubs), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StubError::io(format!("Failed to list {}", stubs), e))?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.starts_with('.') => names.push(name),
                Ok(_) => {},
                Err(name) => warn!("Skipping non UTF-8 directory {:?} in {}", name, stubs),
            }
        }
        names.sort();
        debug!("Found {} distributions in {}", names.len(), stubs);
        Ok(names)
    }

    /// Read the stored record of the directory `name`
    fn read_record(&self, name: &str) -> ConfigResult<MetadataRecord> {
        let path = self.metadata_path(name);
        if !path.is_file() {
            return Err(StubError::MetadataNotFound {
                distribution: name.to_string(),
            });
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| StubError::io(format!("Failed to read {}", path), e))?;

        parse_record(name, path.as_str(), &content)
    }
}

/// Parse a `METADATA.toml` document. Malformed TOML and documents that do
/// not match the schema are both `MetadataInvalid`, located in `reason`.
pub fn parse_record(distribution: &str, file: &str, content: &str) -> ConfigResult<MetadataRecord> {
    check_syntax(file, content).map_err(|e| match e {
        StubError::TomlParse {
            file,
            message,
            line,
            column,
        } => StubError::MetadataInvalid {
            distribution: distribution.to_string(),
            reason: format!("{}: {} (line {}, column {})", file, message, line, column),
        },
        other => other,
    })?;
    toml::from_str(content).map_err(|e| {
        let reason = match e.span() {
            Some(span) => {
                let (line, column) = line_column(content, span.start);
                format!("{} (line {}, column {})", e.message().trim(), line, column)
            },
            None => e.message().trim().to_string(),
        };
        StubError::MetadataInvalid {
            distribution: distribution.to_string(),
            reason,
        }
    })
}

/// A single path component that cannot escape `stubs/`
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

impl MetadataStore for TypeshedDir {
    fn load(&self, distribution: &str) -> StubResult<Metadata> {
        let name = self
            .resolve(distribution)?
            .ok_or_else(|| StubError::MetadataNotFound {
                distribution: distribution.to_string(),
            })?;
        let record = self.read_record(&name)?;
        Metadata::new(name, record)
    }

    fn distributions(&self) -> StubResult<Vec<String>> {
        self.listing().map(<[String]>::to_vec)
    }
}

impl KnownStubs for TypeshedDir {
    fn is_known_stub(&self, stub_name: &str) -> bool {
        let Some(distribution) = strip_types_prefix(stub_name) else {
            return false;
        };
        match self.resolve(distribution) {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!("Cannot tell whether {} is a known stub: {}", stub_name, e);
                false
            },
        }
    }
}
