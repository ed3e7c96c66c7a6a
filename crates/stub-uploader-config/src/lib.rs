//! Filesystem-backed collaborators and settings for the stub uploader
//!
//! This crate reads a typeshed checkout (`stubs/<dist>/METADATA.toml`), the
//! list of stub distributions already uploaded, the allowlist of vetted
//! external dependencies, and the layered `stub-uploader.toml` settings.

mod document;
pub mod allowlist;
pub mod metadata;
pub mod settings;
pub mod uploaded;

// Re-export main types
pub use allowlist::AllowlistFile;
pub use metadata::{TypeshedDir, METADATA_FILE, STUBS_DIR};
pub use settings::{RetrySettings, Settings, SettingsLoader, SettingsOverrides, SettingsSource};
pub use uploaded::UploadedPackages;

use stub_uploader_core::error::StubError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, StubError>;
