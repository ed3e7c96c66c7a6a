//! Collaborator traits the verification engine reads through.
//!
//! The engine never touches the filesystem or the network itself. It asks a
//! `MetadataStore` for declared metadata, a `KnownStubs` provider whether a
//! stub distribution is uploaded from here, an `Allowlist` which external
//! dependencies a stub may declare, and a `PublishedMetadata` provider what
//! the runtime distribution itself requires.

use std::collections::BTreeSet;

use crate::error::StubResult;
use crate::types::Metadata;

mod memory;

pub use memory::{MemoryAllowlist, MemoryIndex, MemoryStore};

/// Source of declared metadata, keyed by runtime distribution name
pub trait MetadataStore {
    /// Load the metadata of `distribution`; fails with `MetadataNotFound`
    /// when the store has no record and `MetadataInvalid` when the record
    /// does not match the schema
    fn load(&self, distribution: &str) -> StubResult<Metadata>;

    /// Every distribution the store holds, sorted
    fn distributions(&self) -> StubResult<Vec<String>>;
}

/// Membership test for stub distributions uploaded from this system
pub trait KnownStubs {
    /// `stub_name` is a stub distribution name such as `types-six`
    fn is_known_stub(&self, stub_name: &str) -> bool;
}

/// Vetted external dependencies per stub distribution
pub trait Allowlist {
    /// Canonical names of the external distributions `stub_name` may declare
    fn allowed(&self, stub_name: &str) -> BTreeSet<String>;
}

/// Published metadata of runtime distributions on the package index
pub trait PublishedMetadata {
    /// Runtime requirement strings (`requires_dist`) of `distribution`, or
    /// `None` when the index has no such distribution
    fn runtime_requires(&self, distribution: &str) -> StubResult<Option<Vec<String>>>;
}
