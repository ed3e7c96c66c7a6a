//! `verify`: recursive verification of named distributions
//!
//! Every distribution is checked even after a failure, so one run reports
//! all of them.

use std::collections::BTreeSet;

use tracing::debug;

use stub_uploader_core::error::StubError;
use stub_uploader_core::types::{canonical_name, stub_distribution};
use stub_uploader_resolver::Verifier;

use crate::output::errors::ErrorFormatter;
use crate::output::OutputHandler;

/// Outcome of verifying a list of distributions
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub passed: Vec<(String, BTreeSet<String>)>,
    pub failures: Vec<(String, StubError)>,
}

impl VerifyReport {
    pub fn checked(&self) -> usize {
        self.passed.len() + self.failures.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Verify each distribution and its stub closure
pub fn run(verifier: &Verifier<'_>, distributions: &[String]) -> VerifyReport {
    let mut report = VerifyReport::default();
    for distribution in distributions {
        match verifier.recursive_verify_distribution(distribution) {
            Ok(closure) => {
                debug!("{} verified with {} stubs in its closure", distribution, closure.len());
                report.passed.push((distribution.clone(), closure));
            },
            Err(err) => report.failures.push((distribution.clone(), err)),
        }
    }
    report
}

pub fn execute(verifier: &Verifier<'_>, distributions: &[String], output: &OutputHandler) -> VerifyReport {
    let report = run(verifier, distributions);
    let formatter = ErrorFormatter::new();

    for (distribution, closure) in &report.passed {
        let own = canonical_name(&stub_distribution(distribution));
        let others: Vec<&str> = closure
            .iter()
            .map(String::as_str)
            .filter(|stub| canonical_name(stub) != own)
            .collect();
        if others.is_empty() {
            output.success(distribution);
        } else {
            output.success(&format!("{} (with {})", distribution, others.join(", ")));
        }
    }
    for (distribution, err) in &report.failures {
        output.error(&format!("{}:", distribution));
        eprint!("{}", formatter.format_error(err));
    }

    report
}
