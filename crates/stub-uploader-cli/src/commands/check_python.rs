//! `check-python`: validate a `requires_python` value

use stub_uploader_core::error::StubResult;
use stub_uploader_resolver::verify_requires_python;

use crate::output::OutputHandler;

pub fn execute(requires_python: &str, output: &OutputHandler) -> StubResult<()> {
    verify_requires_python(requires_python)?;
    output.success(&format!("requires_python = \"{}\" is valid", requires_python));
    Ok(())
}
