//! survey: verify, categorize and analyze student survey comments.
//!
//! Import a structure file, load a comment export into a verification
//! session, commit it, then review stored responses and read the dashboard.

mod commands;
mod config;
mod logging;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use survey_db::Database;
use survey_inference::OpenAIBackend;

use commands::categories::CategoriesCommand;
use commands::dashboard::{DashboardArgs, ExportArgs};
use commands::review::ReviewCommand;
use commands::structure::StructureCommand;
use commands::suggestions::SuggestionsCommand;
use commands::workspace::WorkspaceArgs;
use commands::Stores;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "survey")]
#[command(author, version, about = "Survey comment verification and sentiment dashboard")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply database migrations
    Migrate,

    /// Institutions, faculties and study programs
    #[command(subcommand)]
    Structure(StructureCommand),

    /// Parent categories and sub-categories
    #[command(subcommand)]
    Categories(CategoriesCommand),

    /// Verify a comment export before saving it
    Workspace(WorkspaceArgs),

    /// Browse and correct stored responses
    #[command(subcommand)]
    Review(ReviewCommand),

    /// Sentiment dashboard over stored responses
    Dashboard(DashboardArgs),

    /// Write stored responses to CSV in the import format
    Export(ExportArgs),

    /// Review queue for suggested categories
    #[command(subcommand)]
    Suggestions(SuggestionsCommand),
}

impl Commands {
    fn needs_database(&self) -> bool {
        match self {
            Commands::Workspace(args) => args.command.needs_store(),
            _ => true,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn connect() -> anyhow::Result<Database> {
    let config = AppConfig::from_env()?;
    let db = Database::connect_with_config(&config.database_url, config.pool).await?;
    info!(
        subsystem = "cli",
        op = "connect",
        pool_size = db.pool().size(),
        "Connected to database"
    );
    Ok(db)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let db = if cli.command.needs_database() {
        Some(connect().await?)
    } else {
        None
    };
    let stores = db.as_ref().map(Stores::postgres);

    match cli.command {
        Commands::Migrate => {
            db.as_ref().context("database connection required")?.migrate().await?;
            writeln!(out, "Migrations applied.")?;
        }
        Commands::Workspace(args) => {
            let backend = if args.command.needs_backend() {
                Some(OpenAIBackend::from_env()?)
            } else {
                None
            };
            let backend = backend
                .as_ref()
                .map(|b| b as &dyn survey_core::GenerationBackend);
            commands::workspace::run(args, stores.as_ref(), backend, &mut out).await?;
        }
        command => {
            let Some(stores) = stores.as_ref() else {
                anyhow::bail!("database connection required");
            };
            match command {
                Commands::Structure(cmd) => commands::structure::run(cmd, stores, &mut out).await?,
                Commands::Categories(cmd) => {
                    commands::categories::run(cmd, stores, &mut out).await?
                }
                Commands::Review(cmd) => commands::review::run(cmd, stores, &mut out).await?,
                Commands::Dashboard(args) => {
                    commands::dashboard::run(args, stores, &mut out).await?
                }
                Commands::Export(args) => commands::dashboard::export(args, stores, &mut out).await?,
                Commands::Suggestions(cmd) => {
                    commands::suggestions::run(cmd, stores, &mut out).await?
                }
                Commands::Migrate | Commands::Workspace(_) => {}
            }
        }
    }
    Ok(())
}
