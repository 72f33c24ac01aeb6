//! Subcommand handlers.
//!
//! Handlers take a [`Stores`] bundle and write human-readable output to the
//! given writer, so they run the same against PostgreSQL or the in-memory
//! store.

pub mod categories;
pub mod dashboard;
pub mod review;
pub mod structure;
pub mod suggestions;
pub mod workspace;

use std::sync::Arc;

use clap::Args;

use survey_analytics::FilterSelection;
use survey_core::{
    CategoryRepository, ResponseRepository, StructureRepository, SuggestionRepository,
    TaxonomySnapshot,
};
use survey_db::{Database, MemoryStore};

/// The four repositories a command may touch.
#[derive(Clone)]
pub struct Stores {
    pub structure: Arc<dyn StructureRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub responses: Arc<dyn ResponseRepository>,
    pub suggestions: Arc<dyn SuggestionRepository>,
}

impl Stores {
    pub fn postgres(db: &Database) -> Self {
        Self {
            structure: db.structure.clone(),
            categories: db.categories.clone(),
            responses: db.responses.clone(),
            suggestions: db.suggestions.clone(),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            structure: store.clone(),
            categories: store.clone(),
            responses: store.clone(),
            suggestions: store,
        }
    }

    pub async fn snapshot(&self) -> survey_core::Result<TaxonomySnapshot> {
        TaxonomySnapshot::load(self.structure.as_ref(), self.categories.as_ref()).await
    }
}

/// Response filters given by name.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Faculty name
    #[arg(long)]
    pub faculty: Option<String>,

    /// Study program name
    #[arg(long)]
    pub program: Option<String>,

    /// Positive, Negative or Neutral
    #[arg(long)]
    pub sentiment: Option<String>,

    /// Only responses flagged (true) or not flagged (false) as suggestions
    #[arg(long)]
    pub suggestion: Option<bool>,

    /// Sub-category name; overrides --parent
    #[arg(long)]
    pub sub_category: Option<String>,

    /// Parent category name
    #[arg(long)]
    pub parent: Option<String>,

    /// Case-insensitive text search in comments
    #[arg(long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for FilterSelection {
    fn from(args: FilterArgs) -> Self {
        Self {
            faculty: args.faculty,
            program: args.program,
            sentiment: args.sentiment,
            is_suggestion: args.suggestion,
            sub_category: args.sub_category,
            parent: args.parent,
            search: args.search,
        }
    }
}

/// Join a category list for display.
pub(crate) fn join_names(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
