//! Command implementations and dispatch logic.
//!
//! Each command is a function taking the shared `CommandContext`. The
//! commands that touch the index run synchronously: the registry adapter
//! owns its own runtime.

use camino::Utf8PathBuf;
use tracing::{debug, info};

use stub_uploader_config::{AllowlistFile, Settings, SettingsLoader, SettingsOverrides, TypeshedDir, UploadedPackages};
use stub_uploader_core::error::{StubError, StubResult};
use stub_uploader_core::provider::{KnownStubs, MetadataStore};
use stub_uploader_registry::{BlockingPypi, MetadataCache, PypiClient, RetryConfig};
use stub_uploader_resolver::{AllowlistPolicy, Verifier};

pub mod check_python;
pub mod order;
pub mod plan;
pub mod verify;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub settings: Settings,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load settings starting from the current directory
    pub fn new(overrides: SettingsOverrides) -> StubResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| StubError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| StubError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("current directory is not UTF-8: {}", e),
        })?;

        let (settings, sources) = SettingsLoader::new(cwd).load(&overrides)?;
        for source in &sources {
            debug!("Settings layer: {:?}", source);
        }

        Ok(Self {
            settings,
            output: OutputHandler::new(),
        })
    }

    /// Open every collaborator named by the settings
    pub fn collaborators(&self) -> StubResult<Collaborators> {
        let typeshed = TypeshedDir::open(self.settings.typeshed_dir.clone())?;
        let uploaded = self
            .settings
            .uploaded_packages
            .as_deref()
            .map(UploadedPackages::load)
            .transpose()?;
        let allowlist = match self.settings.allowlist.as_deref() {
            Some(path) => AllowlistFile::load(path)?,
            None => AllowlistFile::default(),
        };

        let retry = &self.settings.retry;
        let client = PypiClient::with_config(
            &self.settings.index_url,
            RetryConfig {
                max_retries: retry.max_retries,
                initial_delay: std::time::Duration::from_millis(retry.initial_delay_ms),
                max_delay: std::time::Duration::from_millis(retry.max_delay_ms),
                ..RetryConfig::default()
            },
        )?;
        let cache = MetadataCache::with_ttl(std::time::Duration::from_secs(self.settings.cache_ttl_secs));
        let index = BlockingPypi::new(client, cache)?;

        Ok(Collaborators {
            typeshed,
            uploaded,
            allowlist,
            index,
        })
    }
}

/// Filesystem and network collaborators of one run
pub struct Collaborators {
    pub typeshed: TypeshedDir,
    pub uploaded: Option<UploadedPackages>,
    pub allowlist: AllowlistFile,
    pub index: BlockingPypi,
}

impl Collaborators {
    /// Uploaded-packages list when configured, otherwise the checkout
    pub fn known(&self) -> &dyn KnownStubs {
        match &self.uploaded {
            Some(uploaded) => uploaded,
            None => &self.typeshed,
        }
    }

    pub fn verifier(&self, policy: AllowlistPolicy) -> Verifier<'_> {
        Verifier::new(&self.typeshed, self.known(), &self.allowlist, &self.index).with_policy(policy)
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    let collaborators = ctx.collaborators()?;

    let result = match command {
        Commands::Plan { distributions, json } => {
            info!("Planning upload of {}", distributions.join(", "));
            let verifier = collaborators.verifier(AllowlistPolicy::Enforce);
            plan::execute(&verifier, &distributions, json, &ctx.output)
        },
        Commands::Verify {
            distributions,
            all,
            unsafe_ignore_allowlist,
        } => {
            let policy = if unsafe_ignore_allowlist {
                AllowlistPolicy::UnsafeIgnore
            } else {
                AllowlistPolicy::Enforce
            };
            let distributions = if all {
                collaborators.typeshed.distributions()?
            } else {
                distributions
            };
            info!("Verifying {} distributions", distributions.len());
            let verifier = collaborators.verifier(policy);
            let report = verify::execute(&verifier, &distributions, &ctx.output);
            if report.failed() > 0 {
                anyhow::bail!(
                    "{} of {} distributions failed verification",
                    report.failed(),
                    report.checked()
                );
            }
            Ok(())
        },
        Commands::Order { distributions } => {
            let verifier = collaborators.verifier(AllowlistPolicy::Enforce);
            order::execute(&verifier, &distributions, &ctx.output)
        },
        Commands::CheckPython { requires_python } => check_python::execute(&requires_python, &ctx.output),
    };

    result.map_err(|err| with_name_hint(err, &collaborators.typeshed, &ctx.output))
}

/// Point at a similarly named distribution when a lookup missed
fn with_name_hint(err: StubError, typeshed: &TypeshedDir, output: &OutputHandler) -> anyhow::Error {
    if let StubError::MetadataNotFound { distribution } = &err {
        if let Ok(names) = typeshed.distributions() {
            if let Some(similar) = suggest_similar_distribution(distribution, &names) {
                output.info(&format!("Did you mean '{}'?", similar));
            }
        }
    }
    err.into()
}

/// Suggest the closest distribution name based on edit distance
pub fn suggest_similar_distribution(input: &str, candidates: &[String]) -> Option<String> {
    let input = input.to_lowercase();
    let threshold = (input.chars().count() / 4).clamp(1, 3);

    candidates
        .iter()
        .map(|candidate| (candidate, edit_distance(&input, &candidate.to_lowercase())))
        .filter(|(_, distance)| *distance <= threshold)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.clone())
}

/// Calculate edit distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single-row Levenshtein
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        previous = current;
    }
    previous[b_chars.len()]
}
