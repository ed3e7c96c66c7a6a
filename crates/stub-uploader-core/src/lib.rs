//! # stub-uploader-core
//!
//! Core types and utilities shared across all stub uploader crates.
//!
//! This crate provides:
//! - `Requirement`, a parsed PEP 508 dependency specifier
//! - `Metadata`, the declared metadata of one stub distribution
//! - Naming helpers for the `types-` stub convention
//! - `StubError` enum for unified error handling
//! - Collaborator traits the verification engine reads through, with
//!   in-memory implementations
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Requirement, Metadata, naming)
//! - `error`: Error types and result aliases
//! - `provider`: Metadata store, known stubs, allowlist and upstream traits

pub mod error;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{RequiresRule, StubError, StubResult};
pub use provider::{
    Allowlist, KnownStubs, MemoryAllowlist, MemoryIndex, MemoryStore, MetadataStore,
    PublishedMetadata,
};
pub use types::{
    canonical_name, strip_types_prefix, stub_distribution, Metadata, MetadataRecord, Requirement,
    TYPES_PREFIX,
};
