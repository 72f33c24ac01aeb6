//! `survey suggestions ...`: the category suggestion review queue.

use std::io::Write;

use clap::Subcommand;
use uuid::Uuid;

use survey_core::SuggestionStatus;
use survey_inference::{accept, reject};

use super::Stores;

#[derive(Subcommand, Debug)]
pub enum SuggestionsCommand {
    /// List queued suggestions, optionally by status
    List {
        /// pending, accepted or rejected
        #[arg(long)]
        status: Option<String>,
    },
    /// Add the suggested parent/sub-category pair to the taxonomy
    Accept { id: Uuid },
    Reject { id: Uuid },
}

pub async fn run(cmd: SuggestionsCommand, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let queue = stores.suggestions.as_ref();
    match cmd {
        SuggestionsCommand::List { status } => {
            let status = status
                .map(|s| s.parse::<SuggestionStatus>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let items = queue.list_suggestions(status).await?;
            if items.is_empty() {
                writeln!(out, "No suggestions.")?;
            }
            for s in &items {
                writeln!(
                    out,
                    "{}\t{}\t{} / {}\t{}",
                    s.id,
                    s.status,
                    s.parent_name,
                    s.child_name,
                    s.created_at_utc.format("%Y-%m-%d %H:%M")
                )?;
            }
        }
        SuggestionsCommand::Accept { id } => {
            let outcome = accept(queue, stores.categories.as_ref(), id).await?;
            writeln!(
                out,
                "Accepted {} / {}.",
                outcome.parent.name, outcome.subcategory.name
            )?;
            if outcome.created_parent {
                writeln!(out, "  created parent category {}", outcome.parent.name)?;
            }
            if outcome.created_subcategory {
                writeln!(out, "  created sub-category {}", outcome.subcategory.name)?;
            }
        }
        SuggestionsCommand::Reject { id } => {
            reject(queue, id).await?;
            writeln!(out, "Rejected.")?;
        }
    }
    Ok(())
}
