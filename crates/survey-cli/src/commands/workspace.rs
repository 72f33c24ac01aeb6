//! `survey workspace ...`
//!
//! The workspace lives in a JSON session file between invocations. Rows are
//! addressed by their `No` value.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Args, Subcommand};

use survey_core::{GenerationBackend, Sentiment};
use survey_import::{MismatchKind, VerificationWorkspace};
use survey_inference::suggest_and_enqueue;

use super::{join_names, Stores};

#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    /// Session file holding the rows being verified
    #[arg(long, global = true, default_value = "survey-session.json")]
    pub session: PathBuf,

    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// Start a session from a comment export
    Load { file: PathBuf },
    /// Print the rows
    Show,
    ToggleCategory { row: String, name: String },
    SetSentiment { row: String, value: String },
    SetSuggestion {
        row: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// List program names that will not resolve and rows without sentiment
    Check,
    /// Save every row as a verified response
    Commit,
    /// Ask the language model for new categories from the session comments
    Suggest,
}

impl WorkspaceCommand {
    pub fn needs_store(&self) -> bool {
        matches!(self, Self::Check | Self::Commit | Self::Suggest)
    }

    pub fn needs_backend(&self) -> bool {
        matches!(self, Self::Suggest)
    }
}

fn open(session: &Path) -> anyhow::Result<VerificationWorkspace> {
    VerificationWorkspace::read_session(session)
        .with_context(|| format!("no session at {}; run `survey workspace load` first", session.display()))
}

fn row_index(ws: &VerificationWorkspace, row: &str) -> anyhow::Result<usize> {
    ws.rows()
        .iter()
        .position(|r| r.row_id == row)
        .ok_or_else(|| anyhow!("no row with No = {}", row))
}

pub async fn run(
    args: WorkspaceArgs,
    stores: Option<&Stores>,
    backend: Option<&dyn GenerationBackend>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let session = args.session.as_path();
    match args.command {
        WorkspaceCommand::Load { file } => {
            let ws = VerificationWorkspace::load_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            ws.write_session(session)?;
            writeln!(out, "Loaded {} rows from {}.", ws.len(), ws.source_name)?;
            for issue in ws.issues() {
                writeln!(out, "  {}", issue)?;
            }
        }
        WorkspaceCommand::Show => {
            let ws = open(session)?;
            for row in ws.rows() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    row.row_id,
                    row.program_name,
                    row.sentiment.map_or("-".to_string(), |s| s.to_string()),
                    if row.is_suggestion { "suggestion" } else { "-" },
                    join_names(row.display_categories()),
                )?;
                writeln!(out, "\t{}", row.comment_text)?;
            }
        }
        WorkspaceCommand::ToggleCategory { row, name } => {
            let mut ws = open(session)?;
            let index = row_index(&ws, &row)?;
            let categories = join_names(ws.toggle_category(index, &name)?);
            ws.write_session(session)?;
            writeln!(out, "{}: {}", row, categories)?;
        }
        WorkspaceCommand::SetSentiment { row, value } => {
            let sentiment: Sentiment = value.parse().map_err(anyhow::Error::msg)?;
            let mut ws = open(session)?;
            let index = row_index(&ws, &row)?;
            ws.set_sentiment(index, sentiment)?;
            ws.write_session(session)?;
            writeln!(out, "{}: {}", row, sentiment)?;
        }
        WorkspaceCommand::SetSuggestion { row, value } => {
            let mut ws = open(session)?;
            let index = row_index(&ws, &row)?;
            ws.set_suggestion_flag(index, value)?;
            ws.write_session(session)?;
            writeln!(out, "{}: is_suggestion = {}", row, value)?;
        }
        WorkspaceCommand::Check => {
            let stores = stores.context("database connection required")?;
            let ws = open(session)?;
            let snapshot = stores.snapshot().await?;
            let mismatches = ws.mismatches(&snapshot);
            let missing = ws.rows_missing_sentiment();
            if mismatches.is_empty() && missing.is_empty() {
                writeln!(out, "All {} rows are ready to commit.", ws.len())?;
            }
            for m in &mismatches {
                match m.kind {
                    MismatchKind::Unknown => writeln!(out, "Unknown Prodi: {}", m.program_name)?,
                    MismatchKind::Ambiguous => {
                        writeln!(out, "Ambiguous Prodi: {} (set Fakultas)", m.program_name)?
                    }
                }
            }
            if !missing.is_empty() {
                writeln!(out, "Rows without sentiment: {}", missing.join(", "))?;
            }
        }
        WorkspaceCommand::Commit => {
            let stores = stores.context("database connection required")?;
            let ws = open(session)?;
            let snapshot = stores.snapshot().await?;
            let outcome = ws.commit(&snapshot, stores.responses.as_ref()).await?;
            if !outcome.success {
                bail!(outcome.message);
            }
            writeln!(out, "{}", outcome.message)?;
        }
        WorkspaceCommand::Suggest => {
            let stores = stores.context("database connection required")?;
            let backend = backend.context("suggestion backend required")?;
            let ws = open(session)?;
            let queued =
                suggest_and_enqueue(backend, stores.suggestions.as_ref(), &ws.comments()).await?;
            writeln!(out, "{} suggestions queued for review.", queued.len())?;
            for s in &queued {
                writeln!(out, "{}\t{} / {}", s.id, s.parent_name, s.child_name)?;
            }
        }
    }
    Ok(())
}
