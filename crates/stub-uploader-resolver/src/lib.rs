//! Requirement verification and publication ordering for stub distributions
//!
//! This crate proves that a stub distribution's declared requirements are
//! legitimate, walks the transitive closure of its stub dependencies, and
//! orders a set of distributions so that no stub is published before the
//! stubs it depends on.

pub mod order;
pub mod rules;
pub mod verify;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export main types
pub use order::{sort_by_dependency, DependencyGraph};
pub use rules::{verify_requires_python, verify_typeshed_req, AllowlistPolicy};
pub use verify::Verifier;

use stub_uploader_core::error::StubError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, StubError>;
