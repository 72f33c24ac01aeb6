//! `survey review ...`: browse and correct stored responses.

use std::io::Write;

use clap::Subcommand;
use uuid::Uuid;

use survey_analytics::FilterSelection;
use survey_core::{defaults, ResponsePageRequest, Sentiment};
use survey_import::review::toggle_category;

use super::{join_names, FilterArgs, Stores};

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// List stored responses, one page at a time
    List {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value_t = 1)]
        page: i64,
    },
    SetSentiment {
        id: Uuid,
        value: String,
    },
    /// Add the category if absent, remove it if present
    ToggleCategory {
        id: Uuid,
        name: String,
    },
    SetSuggestion {
        id: Uuid,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

pub async fn run(cmd: ReviewCommand, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = stores.responses.as_ref();
    match cmd {
        ReviewCommand::List { filter, page } => {
            let snapshot = stores.snapshot().await?;
            let filter = FilterSelection::from(filter).resolve(&snapshot)?;
            let page = repo
                .list_page(&ResponsePageRequest {
                    filter,
                    page,
                    per_page: defaults::PAGE_LIMIT,
                })
                .await?;

            for item in &page.items {
                let r = &item.response;
                writeln!(
                    out,
                    "{}\t{}\t{} / {}\t{}\t{}\t{}",
                    r.id,
                    r.original_row_id,
                    item.faculty_name,
                    item.program_name,
                    r.sentiment,
                    if r.is_suggestion { "suggestion" } else { "-" },
                    join_names(r.display_categories()),
                )?;
                writeln!(out, "\t{}", r.comment_text)?;
            }
            writeln!(
                out,
                "page {} of {} (total {})",
                page.page,
                page.total_pages().max(1),
                page.total
            )?;
        }
        ReviewCommand::SetSentiment { id, value } => {
            let sentiment: Sentiment = value.parse().map_err(anyhow::Error::msg)?;
            repo.update_sentiment(id, sentiment).await?;
            writeln!(out, "{}: {}", id, sentiment)?;
        }
        ReviewCommand::ToggleCategory { id, name } => {
            let categories = toggle_category(repo, id, &name).await?;
            writeln!(out, "{}: {}", id, join_names(&categories))?;
        }
        ReviewCommand::SetSuggestion { id, value } => {
            repo.set_suggestion(id, value).await?;
            writeln!(out, "{}: is_suggestion = {}", id, value)?;
        }
    }
    Ok(())
}
