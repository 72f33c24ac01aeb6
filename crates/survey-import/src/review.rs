//! Edits on already-stored responses.

use tracing::debug;
use uuid::Uuid;

use survey_core::{Error, ResponseRepository, Result};

use crate::workspace::toggle_name;

/// Toggle a category on a stored response and persist the new selection.
///
/// The displayed set is the baseline, the same rule the workspace applies.
pub async fn toggle_category<R>(store: &R, id: Uuid, name: &str) -> Result<Vec<String>>
where
    R: ResponseRepository + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("category name must not be empty".to_string()));
    }
    let response = store.get(id).await?;
    let mut categories = response.display_categories().to_vec();
    toggle_name(&mut categories, name);
    store.set_categories(id, categories.clone()).await?;

    debug!(subsystem = "import", component = "review", op = "toggle_category", %id, category = name, "Updated stored categories");
    Ok(categories)
}
