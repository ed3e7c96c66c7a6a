//! Core data types for stub package verification.
//!
//! This module provides the fundamental types used throughout the uploader:
//! - The `types-` naming convention and PEP 503 name canonicalisation
//! - Parsed dependency specifiers
//! - Per-distribution metadata

pub mod metadata;
pub mod naming;
pub mod requirement;

// Re-export all public types
pub use metadata::{Metadata, MetadataRecord};
pub use naming::{
    canonical_name, strip_stubs_suffix, strip_types_prefix, stub_distribution, STUBS_SUFFIX,
    TYPES_PREFIX,
};
pub use requirement::{Requirement, RequirementError};
