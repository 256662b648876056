//! # employee-import: Directory Import Trigger
//!
//! Command-line entry point that loads the configuration, validates the
//! directory section and runs one employee import.

pub mod config;

use self::config::{get_config, AppConfig};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use employee_import::{
    validate_config, ConfigValidation, DocumentStore, HttpDirectoryClient, ImportOutcome,
    ImportRunner, InMemoryStore,
};
use employee_import_firebase::FirestoreStore;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the YAML configuration file (defaults to `config.yml`)
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import the employee roster from the directory API
    Run(RunArgs),
    /// Validate the directory configuration without importing
    CheckConfig,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Write to an in-memory store instead of Firestore
    #[arg(long)]
    dry_run: bool,
    /// The Google Cloud Project ID. Overrides `firestore.project_id`.
    #[arg(long, env = "FIRESTORE_PROJECT_ID")]
    project_id: Option<String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = get_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::CheckConfig => handle_check_config(&app_config),
        Commands::Run(args) => handle_run(&app_config, args).await,
    }
}

fn report_validation(validation: &ConfigValidation) -> Result<()> {
    match validation {
        ConfigValidation::Valid(config) => {
            println!("Configuration is valid (directory: {}).", config.url);
            Ok(())
        }
        ConfigValidation::Invalid { missing } => {
            bail!("Configuration is missing: {}", missing.join(", "))
        }
    }
}

fn handle_check_config(app_config: &AppConfig) -> Result<()> {
    report_validation(&validate_config(&app_config.raw))
}

async fn handle_run(app_config: &AppConfig, args: &RunArgs) -> Result<()> {
    let validation = validate_config(&app_config.raw);
    if !validation.is_valid() {
        return report_validation(&validation);
    }
    let directory_config = validation.into_result()?;

    let store: Box<dyn DocumentStore> = if args.dry_run {
        info!("Dry run: documents are kept in memory only.");
        Box::new(InMemoryStore::new())
    } else {
        let Some(project_id) = args
            .project_id
            .clone()
            .or_else(|| app_config.firestore.project_id.clone())
        else {
            bail!("A Firestore project ID is required. Use --project-id or set firestore.project_id.");
        };
        Box::new(FirestoreStore::connect(&project_id).await?)
    };

    let directory =
        HttpDirectoryClient::with_timeout(Duration::from_secs(app_config.http.timeout_secs))?;
    let runner = ImportRunner::builder()
        .directory(Box::new(directory))
        .store(store)
        .settings(app_config.import.clone())
        .build()?;

    match runner.run_import(&directory_config).await {
        Ok(outcome) => {
            println!("{}", describe_outcome(&outcome));
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Import failed: {e}");
            Err(e.into())
        }
    }
}

/// One-line, human readable summary of an import outcome.
fn describe_outcome(outcome: &ImportOutcome) -> String {
    match outcome {
        ImportOutcome::Imported(summary) => format!(
            "Import {} committed: {} of {} employees have a valid email.",
            summary.request_id, summary.valid_email_count, summary.employee_count
        ),
        ImportOutcome::Rejected { request_id, status } => format!(
            "Import {request_id} stopped: the directory answered with status {status}."
        ),
    }
}
