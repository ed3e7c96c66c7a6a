//! Verification rules for declared requirements
//!
//! Each rule either succeeds or fails with `StubError::InvalidRequires`
//! naming the rule and carrying the message operators read. The wording of
//! those messages is relied upon by downstream tooling and must not drift.

use std::collections::HashSet;
use std::str::FromStr;

use pep440_rs::{Operator, VersionSpecifiers};
use tracing::{trace, warn};

use stub_uploader_core::error::{RequiresRule, StubError};
use stub_uploader_core::provider::KnownStubs;
use stub_uploader_core::types::{
    canonical_name, strip_stubs_suffix, strip_types_prefix, stub_distribution, Requirement,
    STUBS_SUFFIX, TYPES_PREFIX,
};

use crate::verify::Verifier;
use crate::ResolverResult;


/// How the allowlist applies to an external requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllowlistPolicy {
    /// The requirement must be allowlisted for the declaring stub
    #[default]
    Enforce,
    /// Skip the allowlist; every other rule still applies
    UnsafeIgnore,
}

/// Check a requirement that points at another stub distribution
pub fn verify_typeshed_req(req: &Requirement, known: &dyn KnownStubs) -> ResolverResult<()> {
    trace!("Checking stub requirement {}", req);

    if strip_types_prefix(req.name()).is_none() {
        return Err(StubError::invalid_requires(
            RequiresRule::TypeshedPrefix,
            format!("Expected dependency {} to start with {}", req, TYPES_PREFIX),
        ));
    }

    if !known.is_known_stub(req.canonical_name()) {
        return Err(StubError::invalid_requires(
            RequiresRule::TypeshedUnknown,
            format!("Expected dependency {} to be uploaded from stub_uploader", req),
        ));
    }

    Ok(())
}

/// Check an interpreter constraint: it must parse, and be one `>=` bound
pub fn verify_requires_python(requires_python: &str) -> ResolverResult<()> {
    let specifiers = VersionSpecifiers::from_str(requires_python).map_err(|_| {
        StubError::invalid_requires(
            RequiresRule::RequiresPythonSyntax,
            format!("Invalid requires_python specifier: {}", requires_python),
        )
    })?;

    match specifiers.iter().collect::<Vec<_>>().as_slice() {
        [single] if *single.operator() == Operator::GreaterThanEqual => Ok(()),
        _ => Err(StubError::invalid_requires(
            RequiresRule::RequiresPythonOperator,
            format!(
                "Expected requires_python to be a '>=' specifier, got {}",
                requires_python
            ),
        )),
    }
}

impl Verifier<'_> {
    /// Check a stub requirement against this verifier's known stubs
    pub fn verify_typeshed_req(&self, req: &Requirement) -> ResolverResult<()> {
        verify_typeshed_req(req, self.known)
    }

    /// Check a requirement of the stubs for `upstream_distribution` that
    /// points at a runtime (non-stub) distribution
    pub fn verify_external_req(
        &self,
        req: &Requirement,
        upstream_distribution: &str,
        policy: AllowlistPolicy,
    ) -> ResolverResult<()> {
        trace!("Checking external requirement {} of {}", req, upstream_distribution);
        let name = req.canonical_name();

        if self.known.is_known_stub(name) {
            return Err(StubError::invalid_requires(
                RequiresRule::ExternalUploaded,
                format!("Expected dependency {} to not be uploaded from stub_uploader", req),
            ));
        }

        if strip_types_prefix(name).is_some() {
            return Err(StubError::invalid_requires(
                RequiresRule::ExternalPrefix,
                format!("Expected dependency {} to not start with {}", req, TYPES_PREFIX),
            ));
        }

        // types-foo may always depend on foo itself
        if name == canonical_name(upstream_distribution) {
            return Ok(());
        }

        let requires_dist = self
            .upstream
            .runtime_requires(upstream_distribution)?
            .ok_or_else(|| {
                StubError::invalid_requires(
                    RequiresRule::NoUpstream,
                    format!(
                        "There is no upstream distribution on PyPI, so cannot verify {}",
                        req
                    ),
                )
            })?;

        let declared = runtime_names(upstream_distribution, &requires_dist);
        let runtime_name = strip_stubs_suffix(name);
        if !declared.contains(name) && !declared.contains(runtime_name) {
            return Err(StubError::invalid_requires(
                RequiresRule::NotInRequiresDist,
                format!(
                    "Expected dependency {} to be listed in {}'s requires_dist",
                    req, upstream_distribution
                ),
            ));
        }

        if policy == AllowlistPolicy::UnsafeIgnore {
            return Ok(());
        }

        let allowed = self.allowlist.allowed(&stub_distribution(upstream_distribution));
        if !allowed.contains(name) {
            let mut message = format!(
                "Expected dependency {} to be present in the stub_uploader allowlist",
                req
            );
            let stubs_variant = format!("{}{}", name, STUBS_SUFFIX);
            if allowed.contains(&stubs_variant) {
                message.push_str(&format!(". Did you mean {}?", stubs_variant));
            }
            return Err(StubError::invalid_requires(RequiresRule::NotAllowlisted, message));
        }

        Ok(())
    }
}

/// Canonical names of the runtime requirements an upstream distribution
/// declares; entries that do not parse are skipped
fn runtime_names(upstream_distribution: &str, requires_dist: &[String]) -> HashSet<String> {
    requires_dist
        .iter()
        .filter_map(|raw| match Requirement::parse(raw) {
            Ok(req) => Some(req.canonical_name().to_string()),
            Err(e) => {
                warn!("Ignoring requires_dist entry of {}: {}", upstream_distribution, e);
                None
            },
        })
        .collect()
}
