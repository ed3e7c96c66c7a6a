//! Settings layering, file discovery and environment overrides
//!
//! Precedence, lowest first: built-in defaults, the global settings file,
//! the project `stub-uploader.toml` (found by walking up from the working
//! directory), `STUB_UPLOADER_*` environment variables, command-line flags.
//! Relative paths in a settings file are resolved against that file's
//! directory.

use std::collections::HashMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use stub_uploader_core::error::StubError;

use crate::document::parse_document;
use crate::ConfigResult;

/// Project settings file name
pub const SETTINGS_FILE: &str = "stub-uploader.toml";

/// Package index queried for published metadata
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

const ENV_PREFIX: &str = "STUB_UPLOADER_";

/// Effective settings after layering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the typeshed checkout
    pub typeshed_dir: Utf8PathBuf,
    /// Allowlist file; no file means nothing is allowlisted
    pub allowlist: Option<Utf8PathBuf>,
    /// Uploaded-packages list; without one the checkout answers membership
    pub uploaded_packages: Option<Utf8PathBuf>,
    /// Base URL of the package index
    pub index_url: String,
    /// Retry policy for index requests
    pub retry: RetrySettings,
    /// Lifetime of cached index responses
    pub cache_ttl_secs: u64,
}

/// Retry policy for index requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            typeshed_dir: Utf8PathBuf::from("../typeshed"),
            allowlist: None,
            uploaded_packages: None,
            index_url: DEFAULT_INDEX_URL.to_string(),
            retry: RetrySettings::default(),
            cache_ttl_secs: 3600,
        }
    }
}

/// One settings file; every key is optional so files layer key by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    typeshed_dir: Option<Utf8PathBuf>,
    allowlist: Option<Utf8PathBuf>,
    uploaded_packages: Option<Utf8PathBuf>,
    index_url: Option<String>,
    #[serde(default)]
    retry: RetryFile,
    cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetryFile {
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub typeshed_dir: Option<Utf8PathBuf>,
    pub allowlist: Option<Utf8PathBuf>,
    pub uploaded_packages: Option<Utf8PathBuf>,
    pub index_url: Option<String>,
}

/// Where a settings layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// User-wide settings file
    Global(Utf8PathBuf),
    /// Project settings file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Settings loading interface
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    /// Directory the project file search starts from
    cwd: Utf8PathBuf,
    /// User-wide settings file, if any
    global_path: Option<Utf8PathBuf>,
}

impl SettingsLoader {
    /// Create a loader searching upwards from `cwd`, with the global
    /// settings file in the user's configuration directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let global_path = dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
            .map(|dir| dir.join("stub-uploader").join(SETTINGS_FILE));
        Self { cwd, global_path }
    }

    /// Use `path` as the global settings file, or none
    pub fn with_global_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    /// Find the project settings file (walks up the directory tree)
    pub fn find_settings_file(&self) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());
        while let Some(dir) = current {
            let candidate = dir.join(SETTINGS_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// Layer every source, reading the environment of this process
    pub fn load(&self, overrides: &SettingsOverrides) -> ConfigResult<(Settings, Vec<SettingsSource>)> {
        self.load_with_env(&collect_env_overrides(), overrides)
    }

    /// Layer every source with an explicit environment
    pub fn load_with_env(
        &self,
        env: &HashMap<String, String>,
        overrides: &SettingsOverrides,
    ) -> ConfigResult<(Settings, Vec<SettingsSource>)> {
        let mut settings = Settings::default();
        let mut sources = Vec::new();

        if let Some(global) = self.global_path.as_deref().filter(|path| path.is_file()) {
            apply_file(&mut settings, global)?;
            sources.push(SettingsSource::Global(global.to_path_buf()));
        }

        if let Some(project) = self.find_settings_file() {
            apply_file(&mut settings, &project)?;
            sources.push(SettingsSource::Project(project));
        }

        sources.extend(apply_env(&mut settings, env));

        if apply_overrides(&mut settings, overrides) {
            sources.push(SettingsSource::CommandLine);
        }

        validate(&settings)?;
        debug!("Effective settings: {:?}", settings);
        Ok((settings, sources))
    }
}

/// Collect `STUB_UPLOADER_*` environment variables
pub fn collect_env_overrides() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

fn apply_file(settings: &mut Settings, path: &Utf8Path) -> ConfigResult<()> {
    let content = fs::read_to_string(path)
        .map_err(|e| StubError::io(format!("Failed to read {}", path), e))?;
    let file: SettingsFile = parse_document(path.as_str(), &content)?;
    let base = path.parent().unwrap_or(Utf8Path::new(""));
    debug!("Applying settings from {}", path);

    if let Some(dir) = file.typeshed_dir {
        settings.typeshed_dir = base.join(dir);
    }
    if let Some(allowlist) = file.allowlist {
        settings.allowlist = Some(base.join(allowlist));
    }
    if let Some(uploaded) = file.uploaded_packages {
        settings.uploaded_packages = Some(base.join(uploaded));
    }
    if let Some(index_url) = file.index_url {
        settings.index_url = index_url;
    }
    if let Some(max_retries) = file.retry.max_retries {
        settings.retry.max_retries = max_retries;
    }
    if let Some(initial) = file.retry.initial_delay_ms {
        settings.retry.initial_delay_ms = initial;
    }
    if let Some(max) = file.retry.max_delay_ms {
        settings.retry.max_delay_ms = max;
    }
    if let Some(ttl) = file.cache_ttl_secs {
        settings.cache_ttl_secs = ttl;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, env: &HashMap<String, String>) -> Vec<SettingsSource> {
    let mut applied = Vec::new();
    let mut keys: Vec<&String> = env.keys().collect();
    keys.sort();

    for key in keys {
        let value = &env[key];
        match key.strip_prefix(ENV_PREFIX) {
            Some("TYPESHED_DIR") => settings.typeshed_dir = Utf8PathBuf::from(value),
            Some("ALLOWLIST") => settings.allowlist = Some(Utf8PathBuf::from(value)),
            Some("UPLOADED_PACKAGES") => settings.uploaded_packages = Some(Utf8PathBuf::from(value)),
            Some("INDEX_URL") => settings.index_url = value.clone(),
            _ => continue, // Unknown variable, ignore
        }
        applied.push(SettingsSource::Environment(key.clone()));
    }
    applied
}

fn apply_overrides(settings: &mut Settings, overrides: &SettingsOverrides) -> bool {
    let mut applied = false;
    if let Some(dir) = &overrides.typeshed_dir {
        settings.typeshed_dir = dir.clone();
        applied = true;
    }
    if let Some(allowlist) = &overrides.allowlist {
        settings.allowlist = Some(allowlist.clone());
        applied = true;
    }
    if let Some(uploaded) = &overrides.uploaded_packages {
        settings.uploaded_packages = Some(uploaded.clone());
        applied = true;
    }
    if let Some(index_url) = &overrides.index_url {
        settings.index_url = index_url.clone();
        applied = true;
    }
    applied
}

/// Validate the layered result
pub fn validate(settings: &Settings) -> ConfigResult<()> {
    let url = Url::parse(&settings.index_url).map_err(|e| StubError::ConfigValidation {
        field: "index_url".to_string(),
        reason: format!("'{}' is not a URL: {}", settings.index_url, e),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StubError::ConfigValidation {
            field: "index_url".to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if settings.retry.initial_delay_ms > settings.retry.max_delay_ms {
        return Err(StubError::ConfigValidation {
            field: "retry.initial_delay_ms".to_string(),
            reason: "must not exceed retry.max_delay_ms".to_string(),
        });
    }

    Ok(())
}
