//! Error types and result aliases for stub uploader operations.
//!
//! Provides a unified error type covering metadata loading, requirement
//! verification, dependency ordering and the network/file collaborators.
//! Verification failures carry the exact message operators read, so the
//! wording of `InvalidRequires` messages is stable.

use std::fmt;
use thiserror::Error;

/// Unified error type for all stub uploader operations
#[derive(Error, Debug)]
pub enum StubError {
    // Metadata errors
    #[error("No metadata found for distribution '{distribution}'")]
    MetadataNotFound { distribution: String },

    #[error("Invalid metadata for distribution '{distribution}': {reason}")]
    MetadataInvalid {
        distribution: String,
        reason: String,
    },

    // Verification errors
    #[error("{message}")]
    InvalidRequires { rule: RequiresRule, message: String },

    // Ordering errors
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    // Config errors
    #[error("Failed to parse {file}: {message} at line {line}, column {column}")]
    TomlParse {
        file: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Registry errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which verification rule rejected a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiresRule {
    /// A stub requirement does not carry the `types-` prefix
    TypeshedPrefix,
    /// A stub requirement names a stub that is not uploaded from here
    TypeshedUnknown,
    /// An external requirement names a stub uploaded from here
    ExternalUploaded,
    /// An external requirement carries the `types-` prefix
    ExternalPrefix,
    /// The runtime distribution is not published on the index
    NoUpstream,
    /// The runtime distribution does not itself require the dependency
    NotInRequiresDist,
    /// The dependency has not been vetted for the declaring stub
    NotAllowlisted,
    /// `requires_python` does not parse as a specifier set
    RequiresPythonSyntax,
    /// `requires_python` is not a single `>=` bound
    RequiresPythonOperator,
}

/// Result type alias for stub uploader operations
pub type StubResult<T> = Result<T, StubError>;

impl StubError {
    /// Create a verification failure for the given rule
    pub fn invalid_requires(rule: RequiresRule, message: impl Into<String>) -> Self {
        Self::InvalidRequires {
            rule,
            message: message.into(),
        }
    }

    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// The rule that failed, if this is a verification failure
    pub fn requires_rule(&self) -> Option<RequiresRule> {
        match self {
            StubError::InvalidRequires { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StubError::Network { .. } | StubError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            StubError::MetadataNotFound { .. } => {
                Some("Check the distribution name against the stubs/ directory of the typeshed checkout")
            },
            StubError::MetadataInvalid { .. } => {
                Some("METADATA.toml needs a string 'version' and a list of strings for 'requires'")
            },
            StubError::InvalidRequires { rule, .. } => Some(rule.suggestion()),
            StubError::CircularDependency { .. } => {
                Some("Stub packages must not depend on each other in a loop; remove one of the requirements")
            },
            StubError::Network { .. } => Some("Check your internet connection and try again"),
            _ => None,
        }
    }
}

impl RequiresRule {
    fn suggestion(self) -> &'static str {
        match self {
            RequiresRule::TypeshedPrefix | RequiresRule::ExternalPrefix => {
                "Stub dependencies are spelled types-<name>; runtime dependencies use the runtime name"
            },
            RequiresRule::TypeshedUnknown => {
                "Upload the depended-on stubs first, or depend on the runtime package instead"
            },
            RequiresRule::ExternalUploaded => {
                "Move the requirement so it is declared as a stub dependency"
            },
            RequiresRule::NoUpstream | RequiresRule::NotInRequiresDist => {
                "Only dependencies of the runtime package itself may be declared"
            },
            RequiresRule::NotAllowlisted => {
                "Ask a maintainer to vet the dependency and add it to the allowlist"
            },
            RequiresRule::RequiresPythonSyntax | RequiresRule::RequiresPythonOperator => {
                "Write requires_python as a single lower bound, e.g. \">=3.9\""
            },
        }
    }
}

impl fmt::Display for RequiresRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiresRule::TypeshedPrefix => "typeshed-prefix",
            RequiresRule::TypeshedUnknown => "typeshed-unknown",
            RequiresRule::ExternalUploaded => "external-uploaded",
            RequiresRule::ExternalPrefix => "external-prefix",
            RequiresRule::NoUpstream => "no-upstream",
            RequiresRule::NotInRequiresDist => "not-in-requires-dist",
            RequiresRule::NotAllowlisted => "not-allowlisted",
            RequiresRule::RequiresPythonSyntax => "requires-python-syntax",
            RequiresRule::RequiresPythonOperator => "requires-python-operator",
        };
        f.write_str(name)
    }
}
