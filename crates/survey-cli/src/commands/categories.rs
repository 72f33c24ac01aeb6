//! `survey categories ...`

use std::io::Write;

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use super::Stores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryKind {
    Parent,
    Sub,
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommand {
    /// Print parent categories with their sub-categories
    List,
    AddParent {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    AddSub {
        name: String,
        #[arg(long)]
        parent: Uuid,
    },
    Rename {
        kind: CategoryKind,
        id: Uuid,
        name: String,
    },
    /// Move a sub-category under another parent
    Move {
        id: Uuid,
        parent_id: Uuid,
    },
    /// Delete a category; deleting a parent removes its sub-categories
    Delete {
        kind: CategoryKind,
        id: Uuid,
    },
}

pub async fn run(cmd: CategoriesCommand, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = stores.categories.as_ref();
    match cmd {
        CategoriesCommand::List => {
            let snapshot = stores.snapshot().await?;
            if snapshot.parents.is_empty() {
                writeln!(out, "No categories.")?;
            }
            for parent in &snapshot.parents {
                match &parent.description {
                    Some(d) => writeln!(out, "{}  {}  ({})", parent.id, parent.name, d)?,
                    None => writeln!(out, "{}  {}", parent.id, parent.name)?,
                }
                for sub in snapshot
                    .subcategories
                    .iter()
                    .filter(|s| s.parent_category_id == parent.id)
                {
                    writeln!(out, "  {}  {}", sub.id, sub.name)?;
                }
            }
        }
        CategoriesCommand::AddParent { name, description } => {
            let parent = repo.create_parent(&name, description.as_deref()).await?;
            writeln!(out, "{}\t{}", parent.id, parent.name)?;
        }
        CategoriesCommand::AddSub { name, parent } => {
            let sub = repo.create_subcategory(&name, parent).await?;
            writeln!(out, "{}\t{}", sub.id, sub.name)?;
        }
        CategoriesCommand::Rename { kind, id, name } => {
            match kind {
                CategoryKind::Parent => repo.rename_parent(id, &name).await?,
                CategoryKind::Sub => {
                    let subs = repo.list_subcategories().await?;
                    let current = subs
                        .iter()
                        .find(|s| s.id == id)
                        .with_context(|| format!("sub-category {} not found", id))?;
                    repo.update_subcategory(id, &name, current.parent_category_id).await?
                }
            }
            writeln!(out, "Renamed.")?;
        }
        CategoriesCommand::Move { id, parent_id } => {
            let subs = repo.list_subcategories().await?;
            let current = subs
                .iter()
                .find(|s| s.id == id)
                .with_context(|| format!("sub-category {} not found", id))?;
            repo.update_subcategory(id, &current.name, parent_id).await?;
            writeln!(out, "Moved.")?;
        }
        CategoriesCommand::Delete { kind, id } => {
            match kind {
                CategoryKind::Parent => repo.delete_parent(id).await?,
                CategoryKind::Sub => repo.delete_subcategory(id).await?,
            }
            writeln!(out, "Deleted.")?;
        }
    }
    Ok(())
}
