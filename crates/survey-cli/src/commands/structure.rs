//! `survey structure ...`

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use survey_core::TaxonomySnapshot;
use survey_import::{parse_structure_file, reconcile};

use super::Stores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StructureKind {
    Institution,
    Faculty,
    Program,
}

#[derive(Subcommand, Debug)]
pub enum StructureCommand {
    /// Import an Institusi/Fakultas/Prodi file, creating what is missing
    Import {
        /// Delimited structure file
        file: PathBuf,
    },
    /// Print the institution → faculty → program tree
    List,
    AddInstitution {
        name: String,
    },
    AddFaculty {
        name: String,
        #[arg(long)]
        institution: Uuid,
    },
    AddProgram {
        name: String,
        #[arg(long)]
        faculty: Uuid,
    },
    Rename {
        kind: StructureKind,
        id: Uuid,
        name: String,
    },
    /// Re-parent a faculty or program
    Move {
        kind: StructureKind,
        id: Uuid,
        parent_id: Uuid,
    },
    /// Delete an entity; faculties and programs below it go too
    Delete {
        kind: StructureKind,
        id: Uuid,
    },
}

pub async fn run(cmd: StructureCommand, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = stores.structure.as_ref();
    match cmd {
        StructureCommand::Import { file } => {
            let parsed = parse_structure_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let snapshot = stores.snapshot().await?;
            let outcome = reconcile(&parsed.rows, &snapshot, repo).await?;
            writeln!(out, "Import complete. {} new items created.", outcome.new_items)?;
            for issue in parsed.issues.iter().chain(outcome.issues.iter()) {
                writeln!(out, "  skipped {}", issue)?;
            }
        }
        StructureCommand::List => {
            let snapshot = stores.snapshot().await?;
            print_tree(&snapshot, out)?;
        }
        StructureCommand::AddInstitution { name } => {
            let inst = repo.create_institution(&name).await?;
            writeln!(out, "{}\t{}", inst.id, inst.name)?;
        }
        StructureCommand::AddFaculty { name, institution } => {
            let faculty = repo.create_faculty(&name, institution).await?;
            writeln!(out, "{}\t{}", faculty.id, faculty.name)?;
        }
        StructureCommand::AddProgram { name, faculty } => {
            let program = repo.create_program(&name, faculty).await?;
            writeln!(out, "{}\t{}", program.id, program.name)?;
        }
        StructureCommand::Rename { kind, id, name } => {
            match kind {
                StructureKind::Institution => repo.rename_institution(id, &name).await?,
                StructureKind::Faculty => {
                    let snapshot = stores.snapshot().await?;
                    let current = snapshot
                        .faculty(id)
                        .with_context(|| format!("faculty {} not found", id))?;
                    repo.update_faculty(id, &name, current.institution_id).await?
                }
                StructureKind::Program => {
                    let snapshot = stores.snapshot().await?;
                    let current = snapshot
                        .program(id)
                        .with_context(|| format!("program {} not found", id))?;
                    repo.update_program(id, &name, current.faculty_id).await?
                }
            }
            writeln!(out, "Renamed.")?;
        }
        StructureCommand::Move { kind, id, parent_id } => {
            let snapshot = stores.snapshot().await?;
            match kind {
                StructureKind::Institution => bail!("institutions have no parent"),
                StructureKind::Faculty => {
                    let current = snapshot
                        .faculty(id)
                        .with_context(|| format!("faculty {} not found", id))?;
                    repo.update_faculty(id, &current.name, parent_id).await?
                }
                StructureKind::Program => {
                    let current = snapshot
                        .program(id)
                        .with_context(|| format!("program {} not found", id))?;
                    repo.update_program(id, &current.name, parent_id).await?
                }
            }
            writeln!(out, "Moved.")?;
        }
        StructureCommand::Delete { kind, id } => {
            match kind {
                StructureKind::Institution => repo.delete_institution(id).await?,
                StructureKind::Faculty => repo.delete_faculty(id).await?,
                StructureKind::Program => repo.delete_program(id).await?,
            }
            writeln!(out, "Deleted.")?;
        }
    }
    Ok(())
}

fn print_tree(snapshot: &TaxonomySnapshot, out: &mut dyn Write) -> std::io::Result<()> {
    if snapshot.institutions.is_empty() {
        return writeln!(out, "No institutions.");
    }
    for inst in &snapshot.institutions {
        writeln!(out, "{}  {}", inst.id, inst.name)?;
        for faculty in snapshot.faculties.iter().filter(|f| f.institution_id == inst.id) {
            writeln!(out, "  {}  {}", faculty.id, faculty.name)?;
            for program in snapshot.programs.iter().filter(|p| p.faculty_id == faculty.id) {
                writeln!(out, "    {}  {}", program.id, program.name)?;
            }
        }
    }
    Ok(())
}
