//! `plan`: what an upload of the given distributions would publish
//!
//! Sorts the request into publication order, then loads and recursively
//! verifies each distribution in that order. Nothing is built or uploaded.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use stub_uploader_core::error::{StubError, StubResult};
use stub_uploader_resolver::Verifier;

use crate::output::OutputHandler;

/// One distribution of an upload plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub distribution: String,
    pub stub_distribution: String,
    pub version: String,
    /// Stub names of the verified closure, including this one
    pub closure: BTreeSet<String>,
    /// `false` when `upload = false` in METADATA.toml
    pub upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obsolete_since: Option<String>,
}

/// Build the plan; the first failing distribution aborts it
pub fn build(verifier: &Verifier<'_>, distributions: &[String]) -> StubResult<Vec<PlanEntry>> {
    let order = verifier.sort_by_dependency(distributions)?;

    let mut plan = Vec::with_capacity(order.len());
    for distribution in order {
        let metadata = verifier.load(&distribution)?;
        let closure = verifier.recursive_verify(&metadata)?;
        debug!("Planned {} {}", metadata.stub_distribution(), metadata.version());

        plan.push(PlanEntry {
            stub_distribution: metadata.stub_distribution(),
            version: metadata.version().to_string(),
            closure,
            upload: metadata.upload(),
            obsolete_since: metadata.obsolete_since().map(str::to_string),
            distribution,
        });
    }
    Ok(plan)
}

pub fn execute(
    verifier: &Verifier<'_>,
    distributions: &[String],
    json: bool,
    output: &OutputHandler,
) -> StubResult<()> {
    let plan = build(verifier, distributions)?;

    if json {
        let rendered = serde_json::to_string_pretty(&plan).map_err(|e| StubError::ConfigValidation {
            field: "plan".to_string(),
            reason: format!("Failed to render JSON: {}", e),
        })?;
        output.plain(&rendered);
        return Ok(());
    }

    for (position, entry) in plan.iter().enumerate() {
        let line = format!("{}. {} {}", position + 1, entry.stub_distribution, entry.version);
        if entry.upload {
            output.success(&line);
        } else {
            output.warn(&format!("{} (skipped: upload = false)", line));
        }
        if let Some(since) = &entry.obsolete_since {
            output.info(&format!("   obsolete since {}", since));
        }
    }
    let skipped = plan.iter().filter(|entry| !entry.upload).count();
    output.info(&format!(
        "{} to upload, {} skipped",
        plan.len() - skipped,
        skipped
    ));
    Ok(())
}
