use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use licenzia_core::{AddressValidator, ExpertiseConfig, RawDocument};
use licenzia_engine::{Expertise, process_document};
use licenzia_registry::{FallbackTable, RegistryValidator};
use tracing::info;

mod display;

#[derive(Parser)]
#[command(name = "licenzia", version, about = "Automated expertise of license applications")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "LICENZIA_CONFIG")]
    config: Option<PathBuf>,

    /// Answer address lookups from the reference table only
    #[arg(long, global = true, env = "LICENZIA_OFFLINE")]
    offline: bool,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a submission and print the verdict
    Evaluate {
        /// Case identifier carried into the result
        #[arg(long, default_value = "LOCAL")]
        case_id: String,

        /// Print the result as JSON instead of a card
        #[arg(long)]
        json: bool,

        /// Submitted documents, in submission order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show how each document is classified and what is extracted from it
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Look an address up in the registry
    CheckAddress { address: String },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("licenzia error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = ExpertiseConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    info!("licenzia v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Evaluate {
            case_id,
            json,
            files,
        } => {
            let validator = validator(&config, cli.offline)?;
            let documents = read_documents(&files)?;
            let expertise = Expertise::new(config.rules, validator);
            let result = expertise
                .evaluate(&case_id, documents)
                .await
                .with_context(|| format!("evaluation of case {case_id} failed"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", display::verdict_card(&result, chrono::Local::now()));
            }
        }
        Command::Classify { files } => {
            for doc in read_documents(&files)? {
                let outcome = tokio::task::spawn_blocking(move || process_document(&doc))
                    .await
                    .context("document worker failed")?;
                print!("{}", display::document_card(&outcome)?);
            }
        }
        Command::CheckAddress { address } => {
            let validator = validator(&config, cli.offline)?;
            let limit = config.rules.address_timeout();
            let resolution = tokio::time::timeout(limit, validator.resolve_address(&address))
                .await
                .context("address registry timed out")??;
            let code = match resolution.location_id.as_deref() {
                Some(id) => tokio::time::timeout(limit, validator.resolve_subdivision_code(id))
                    .await
                    .context("subdivision lookup timed out")??,
                None => None,
            };
            print!("{}", display::address_card(&address, &resolution, code.as_deref()));
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LICENZIA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn validator(config: &ExpertiseConfig, offline: bool) -> anyhow::Result<Arc<dyn AddressValidator>> {
    if offline {
        info!("offline mode, reference table only");
        return Ok(Arc::new(RegistryValidator::offline(FallbackTable::builtin())));
    }
    let validator = RegistryValidator::from_config(&config.registry)
        .context("failed to set up the address registry client")?;
    Ok(Arc::new(validator))
}

fn read_documents(files: &[PathBuf]) -> anyhow::Result<Vec<RawDocument>> {
    files
        .iter()
        .map(|path| {
            let content =
                std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok(RawDocument::new(file_name(path), content))
        })
        .collect()
}

/// The base name is the classification hint, so directories are dropped.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
