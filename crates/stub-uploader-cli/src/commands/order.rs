//! `order`: print distributions in publication order

use stub_uploader_core::error::StubResult;
use stub_uploader_resolver::Verifier;

use crate::output::OutputHandler;

pub fn execute(verifier: &Verifier<'_>, distributions: &[String], output: &OutputHandler) -> StubResult<()> {
    for distribution in verifier.sort_by_dependency(distributions)? {
        output.plain(&distribution);
    }
    Ok(())
}
