//! Parsed dependency specifiers.
//!
//! Requirement strings follow PEP 508 (`name [extras] [specifier] [; marker]`).
//! Two requirements are equal when their canonical names are equal; the
//! version constraint does not take part in identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use pep508_rs::{Requirement as Pep508Requirement, VersionOrUrl};
use thiserror::Error;

use super::naming::canonical_name;

/// A requirement string that does not follow PEP 508
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid requirement '{raw}': {reason}")]
pub struct RequirementError {
    pub raw: String,
    pub reason: String,
}

/// A single parsed dependency specifier
#[derive(Debug, Clone)]
pub struct Requirement {
    name: String,
    canonical: String,
    constraint: Option<String>,
    display: String,
}

impl Requirement {
    /// Parse a PEP 508 requirement string
    ///
    /// The grammar is checked by `pep508_rs`; the name and the text used
    /// for display are kept as written, so diagnostics quote the author.
    pub fn parse(raw: &str) -> Result<Self, RequirementError> {
        let text = raw.trim();
        let parsed = Pep508Requirement::from_str(text).map_err(|e| RequirementError {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;

        let constraint = match &parsed.version_or_url {
            Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
                let text = specifiers.to_string();
                (!text.is_empty()).then_some(text)
            },
            Some(VersionOrUrl::Url(url)) => Some(format!("@ {}", url)),
            None => None,
        };

        let name = match declared_name(text) {
            "" => parsed.name.to_string(),
            declared => declared.to_string(),
        };

        Ok(Self {
            canonical: canonical_name(&name),
            display: text.to_string(),
            name,
            constraint,
        })
    }

    /// Distribution name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// PEP 503 canonical form of the name
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// Version constraint, if any (e.g. `>=0.1`)
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

/// Leading PEP 508 identifier of a requirement string
fn declared_name(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .unwrap_or(text.len());
    &text[..end]
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl PartialEq for Requirement {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Requirement {}

impl Hash for Requirement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_bare_name() {
        let req = Requirement::parse("types-six").unwrap();
        assert_eq!(req.name(), "types-six");
        assert_eq!(req.canonical_name(), "types-six");
        assert_eq!(req.constraint(), None);
        assert_eq!(req.to_string(), "types-six");
    }

    #[test]
    fn test_parse_with_constraint() {
        let req = Requirement::parse("types-six>=0.1").unwrap();
        assert_eq!(req.canonical_name(), "types-six");
        assert_eq!(req.constraint(), Some(">=0.1"));
    }

    #[test]
    fn test_parse_with_marker() {
        let req: Requirement = "tomli>=1.1.0; python_version < \"3.11\"".parse().unwrap();
        assert_eq!(req.canonical_name(), "tomli");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Requirement::parse("not a requirement!!").unwrap_err();
        assert_eq!(err.raw, "not a requirement!!");
    }

    #[test]
    fn test_declared_spelling_is_kept() {
        let req = Requirement::parse("  typing_extensions>=4 ").unwrap();
        assert_eq!(req.name(), "typing_extensions");
        assert_eq!(req.canonical_name(), "typing-extensions");
        assert_eq!(req.constraint(), Some(">=4"));
        assert_eq!(req.to_string(), "typing_extensions>=4");

        let req = Requirement::parse("Flask[async] >= 2.0").unwrap();
        assert_eq!(req.name(), "Flask");
        assert_eq!(req.to_string(), "Flask[async] >= 2.0");
    }

    #[test]
    fn test_identity_is_by_canonical_name() {
        let a = Requirement::parse("typing_extensions>=4").unwrap();
        let b = Requirement::parse("typing-extensions").unwrap();
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
