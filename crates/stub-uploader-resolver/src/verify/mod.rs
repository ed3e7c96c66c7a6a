//! Verification of a stub distribution and its transitive stub dependencies
//!
//! The verifier reads everything through the collaborator traits of
//! `stub-uploader-core`; it holds no state of its own between calls, so
//! independent verifications may run on separate threads with separate
//! verifiers.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use stub_uploader_core::provider::{Allowlist, KnownStubs, MetadataStore, PublishedMetadata};
use stub_uploader_core::types::{canonical_name, strip_types_prefix, Metadata, Requirement};

use crate::rules::{verify_requires_python, verify_typeshed_req, AllowlistPolicy};
use crate::ResolverResult;

#[cfg(test)]
mod tests;

/// Verification engine over a corpus of stub distributions
pub struct Verifier<'a> {
    /// Declared metadata of every stub distribution
    pub(crate) store: &'a dyn MetadataStore,
    /// Stub distributions uploaded from this system
    pub(crate) known: &'a dyn KnownStubs,
    /// Vetted external dependencies
    pub(crate) allowlist: &'a dyn Allowlist,
    /// Runtime requirements published on the index
    pub(crate) upstream: &'a dyn PublishedMetadata,
    /// Allowlist handling for `requires_external`
    policy: AllowlistPolicy,
}

impl<'a> Verifier<'a> {
    /// Create a verifier that enforces the allowlist
    pub fn new(
        store: &'a dyn MetadataStore,
        known: &'a dyn KnownStubs,
        allowlist: &'a dyn Allowlist,
        upstream: &'a dyn PublishedMetadata,
    ) -> Self {
        Self {
            store,
            known,
            allowlist,
            upstream,
            policy: AllowlistPolicy::Enforce,
        }
    }

    /// Change how the allowlist is applied to external requirements
    pub fn with_policy(mut self, policy: AllowlistPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AllowlistPolicy {
        self.policy
    }

    /// Load the metadata of `distribution` from the store
    pub fn load(&self, distribution: &str) -> ResolverResult<Metadata> {
        self.store.load(distribution)
    }

    /// Verified stub requirements of `metadata`
    ///
    /// Evaluated afresh on every call: the outcome depends on this
    /// verifier's collaborators and policy, not only on the metadata.
    pub fn requires_typeshed<'m>(&self, metadata: &'m Metadata) -> ResolverResult<Vec<&'m Requirement>> {
        let reqs = metadata.unvalidated_requires_typeshed(self.known);
        for req in &reqs {
            verify_typeshed_req(req, self.known)?;
        }
        Ok(reqs)
    }

    /// Verified external requirements of `metadata`
    pub fn requires_external<'m>(&self, metadata: &'m Metadata) -> ResolverResult<Vec<&'m Requirement>> {
        let reqs = metadata.unvalidated_requires_external(self.known);
        for req in &reqs {
            self.verify_external_req(req, metadata.distribution(), self.policy)?;
        }
        Ok(reqs)
    }

    /// Apply every rule to a single distribution, without recursing
    pub fn verify_metadata(&self, metadata: &Metadata) -> ResolverResult<()> {
        if let Some(requires_python) = metadata.requires_python() {
            verify_requires_python(requires_python)?;
        }
        self.requires_typeshed(metadata)?;
        self.requires_external(metadata)?;
        Ok(())
    }

    /// Verify `metadata` and every stub distribution it depends on,
    /// directly or transitively, returning the stub names of the closure
    /// (including its own)
    pub fn recursive_verify(&self, metadata: &Metadata) -> ResolverResult<BTreeSet<String>> {
        let mut closure = BTreeSet::new();
        let mut visited = HashSet::new();
        self.visit(metadata, &mut closure, &mut visited)?;
        Ok(closure)
    }

    /// Load `distribution` and verify its closure
    pub fn recursive_verify_distribution(&self, distribution: &str) -> ResolverResult<BTreeSet<String>> {
        let metadata = self.store.load(distribution)?;
        self.recursive_verify(&metadata)
    }

    fn visit(
        &self,
        metadata: &Metadata,
        closure: &mut BTreeSet<String>,
        visited: &mut HashSet<String>,
    ) -> ResolverResult<()> {
        let stub_name = metadata.stub_distribution();
        if !visited.insert(canonical_name(&stub_name)) {
            return Ok(());
        }
        debug!("Verifying {} {}", stub_name, metadata.version());
        closure.insert(stub_name);

        if let Some(requires_python) = metadata.requires_python() {
            verify_requires_python(requires_python)?;
        }
        let stub_requires = self.requires_typeshed(metadata)?;
        self.requires_external(metadata)?;

        for req in stub_requires {
            if visited.contains(req.canonical_name()) {
                continue;
            }
            let Some(distribution) = strip_types_prefix(req.name()) else {
                continue;
            };
            let dependency = self.store.load(distribution)?;
            self.visit(&dependency, closure, visited)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Verifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
