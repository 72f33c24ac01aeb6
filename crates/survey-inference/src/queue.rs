//! Review queue for suggested categories.
//!
//! Accepting a suggestion find-or-creates the parent category by name and
//! then the sub-category under it. Rejecting only marks the row.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use survey_core::{
    CategoryRepository, Error, ParentCategory, PendingSuggestion, Result, SubCategory,
    SuggestionRepository, SuggestionStatus,
};

/// What accepting a suggestion did to the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptOutcome {
    pub parent: ParentCategory,
    pub subcategory: SubCategory,
    pub created_parent: bool,
    pub created_subcategory: bool,
}

async fn pending<Q>(queue: &Q, id: Uuid) -> Result<PendingSuggestion>
where
    Q: SuggestionRepository + ?Sized,
{
    let suggestion = queue.get_suggestion(id).await?;
    if suggestion.status != SuggestionStatus::Pending {
        return Err(Error::InvalidInput(format!(
            "suggestion {} is already {}",
            id, suggestion.status
        )));
    }
    Ok(suggestion)
}

/// Add the suggested pair to the taxonomy and mark the suggestion accepted.
///
/// Names compare exactly after trimming, the same rule the structure import
/// uses.
pub async fn accept<Q, C>(queue: &Q, categories: &C, id: Uuid) -> Result<AcceptOutcome>
where
    Q: SuggestionRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    let suggestion = pending(queue, id).await?;
    let parent_name = suggestion.parent_name.trim();
    let child_name = suggestion.child_name.trim();

    let existing_parent = categories
        .list_parents()
        .await?
        .into_iter()
        .find(|p| p.name == parent_name);
    let created_parent = existing_parent.is_none();
    let parent = match existing_parent {
        Some(p) => p,
        None => categories.create_parent(parent_name, None).await?,
    };

    let existing_sub = categories
        .list_subcategories()
        .await?
        .into_iter()
        .find(|s| s.parent_category_id == parent.id && s.name == child_name);
    let created_subcategory = existing_sub.is_none();
    let subcategory = match existing_sub {
        Some(s) => s,
        None => categories.create_subcategory(child_name, parent.id).await?,
    };

    queue.set_suggestion_status(id, SuggestionStatus::Accepted).await?;

    info!(
        subsystem = "inference",
        component = "queue",
        op = "accept",
        %id,
        parent = %parent.name,
        subcategory = %subcategory.name,
        created_parent,
        created_subcategory,
        "Suggestion accepted"
    );
    Ok(AcceptOutcome {
        parent,
        subcategory,
        created_parent,
        created_subcategory,
    })
}

pub async fn reject<Q>(queue: &Q, id: Uuid) -> Result<()>
where
    Q: SuggestionRepository + ?Sized,
{
    pending(queue, id).await?;
    queue.set_suggestion_status(id, SuggestionStatus::Rejected).await?;
    info!(subsystem = "inference", component = "queue", op = "reject", %id, "Suggestion rejected");
    Ok(())
}
