//! # stub-uploader
//!
//! Verifies the declared metadata of typeshed stub distributions and orders
//! them for upload.
//!
//! This is the entry point of the `stub-uploader` binary. It parses the
//! command line, sets up logging, loads the layered settings and dispatches
//! to the command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stub_uploader_config::SettingsOverrides;
use stub_uploader_core::error::StubError;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Verify and order typeshed stub distributions for upload
#[derive(Parser, Debug)]
#[command(name = "stub-uploader", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root of the typeshed checkout
    #[arg(long, global = true, value_name = "DIR")]
    pub typeshed_dir: Option<Utf8PathBuf>,

    /// Allowlist of vetted external dependencies
    #[arg(long, global = true, value_name = "FILE")]
    pub allowlist: Option<Utf8PathBuf>,

    /// List of stub distributions already uploaded
    #[arg(long, global = true, value_name = "FILE")]
    pub uploaded_packages: Option<Utf8PathBuf>,

    /// Base URL of the package index
    #[arg(long, global = true, value_name = "URL")]
    pub index_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Order, verify and report what an upload would publish
    Plan {
        #[arg(required = true, value_name = "DISTRIBUTION")]
        distributions: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify distributions and every stub they depend on
    Verify {
        #[arg(value_name = "DISTRIBUTION", required_unless_present = "all")]
        distributions: Vec<String>,
        /// Verify every distribution in the checkout
        #[arg(long, conflicts_with = "distributions")]
        all: bool,
        /// Skip the allowlist check for external dependencies
        #[arg(long)]
        unsafe_ignore_allowlist: bool,
    },
    /// Print distributions in publication order, one per line
    Order {
        #[arg(required = true, value_name = "DISTRIBUTION")]
        distributions: Vec<String>,
    },
    /// Check a requires_python value
    CheckPython {
        #[arg(value_name = "SPECIFIER")]
        requires_python: String,
    },
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            typeshed_dir: self.typeshed_dir.clone(),
            allowlist: self.allowlist.clone(),
            uploaded_packages: self.uploaded_packages.clone(),
            index_url: self.index_url.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting stub-uploader v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let formatter = ErrorFormatter::new();
            match err.downcast_ref::<StubError>() {
                Some(stub_error) => eprint!("{}", formatter.format_error(stub_error)),
                None => eprintln!("{}", formatter.format_simple(&format!("{:#}", err))),
            }
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    // Interpreter checks need no settings or checkout
    if let Commands::CheckPython { requires_python } = &cli.command {
        return Ok(commands::check_python::execute(requires_python, &output::OutputHandler::new())?);
    }

    let ctx = CommandContext::new(cli.overrides())?;
    commands::dispatch_command(cli.command, &ctx)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stub_uploader={level},stub_uploader_core={level},stub_uploader_config={level},\
             stub_uploader_registry={level},stub_uploader_resolver={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("stub-uploader encountered an unexpected error: {}", panic_info);
        eprintln!("stub-uploader crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
