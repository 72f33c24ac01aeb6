//! In-memory copy of both taxonomies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::normalize::normalize_name;
use crate::traits::{CategoryRepository, StructureRepository};

/// Reference data loaded once per operation and consulted by the reconciler,
/// the commit step and the analytics engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomySnapshot {
    pub institutions: Vec<Institution>,
    pub faculties: Vec<Faculty>,
    pub programs: Vec<StudyProgram>,
    pub parents: Vec<ParentCategory>,
    pub subcategories: Vec<SubCategory>,
}

impl TaxonomySnapshot {
    /// Read every taxonomy table concurrently.
    pub async fn load<S, C>(structure: &S, categories: &C) -> Result<Self>
    where
        S: StructureRepository + ?Sized,
        C: CategoryRepository + ?Sized,
    {
        let (institutions, faculties, programs, parents, subcategories) = futures::try_join!(
            structure.list_institutions(),
            structure.list_faculties(),
            structure.list_programs(),
            categories.list_parents(),
            categories.list_subcategories(),
        )?;
        Ok(Self {
            institutions,
            faculties,
            programs,
            parents,
            subcategories,
        })
    }

    pub fn institution_named(&self, name: &str) -> Option<&Institution> {
        self.institutions.iter().find(|i| i.name == name)
    }

    pub fn faculty_named(&self, name: &str, institution_id: Uuid) -> Option<&Faculty> {
        self.faculties
            .iter()
            .find(|f| f.name == name && f.institution_id == institution_id)
    }

    pub fn program_named(&self, name: &str, faculty_id: Uuid) -> Option<&StudyProgram> {
        self.programs
            .iter()
            .find(|p| p.name == name && p.faculty_id == faculty_id)
    }

    /// Resolve an imported program name by normalized comparison.
    ///
    /// When several programs share the normalized name, the row's faculty and
    /// institution names (also normalized) narrow the candidates. A name that
    /// still matches more than one program is [`ProgramMatch::Ambiguous`].
    pub fn resolve_program(
        &self,
        name: &str,
        faculty: Option<&str>,
        institution: Option<&str>,
    ) -> ProgramMatch<'_> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return ProgramMatch::Missing;
        }
        let mut candidates: Vec<&StudyProgram> = self
            .programs
            .iter()
            .filter(|p| normalize_name(&p.name) == wanted)
            .collect();
        if candidates.is_empty() {
            return ProgramMatch::Missing;
        }

        if candidates.len() > 1 {
            if let Some(faculty) = faculty.map(normalize_name).filter(|f| !f.is_empty()) {
                candidates.retain(|p| {
                    self.faculty(p.faculty_id)
                        .is_some_and(|f| normalize_name(&f.name) == faculty)
                });
            }
        }
        if candidates.len() > 1 {
            if let Some(institution) = institution.map(normalize_name).filter(|i| !i.is_empty()) {
                candidates.retain(|p| {
                    self.faculty(p.faculty_id)
                        .and_then(|f| self.institutions.iter().find(|i| i.id == f.institution_id))
                        .is_some_and(|i| normalize_name(&i.name) == institution)
                });
            }
        }

        match candidates.as_slice() {
            [only] => ProgramMatch::Found(only),
            // several programs carry the name, none or many under the row's faculty
            _ => ProgramMatch::Ambiguous,
        }
    }

    /// [`resolve_program`](Self::resolve_program) using the names carried by an import row.
    pub fn resolve_row_program(&self, row: &WorkingRow) -> ProgramMatch<'_> {
        self.resolve_program(&row.program_name, row.faculty.as_deref(), row.institution.as_deref())
    }

    pub fn faculty(&self, id: Uuid) -> Option<&Faculty> {
        self.faculties.iter().find(|f| f.id == id)
    }

    pub fn program(&self, id: Uuid) -> Option<&StudyProgram> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn parent(&self, id: Uuid) -> Option<&ParentCategory> {
        self.parents.iter().find(|p| p.id == id)
    }

    /// Ids of the programs under a faculty.
    pub fn program_ids_in_faculty(&self, faculty_id: Uuid) -> Vec<Uuid> {
        self.programs
            .iter()
            .filter(|p| p.faculty_id == faculty_id)
            .map(|p| p.id)
            .collect()
    }

    /// Sub-category names under a parent, in snapshot order.
    pub fn subcategory_names(&self, parent_id: Uuid) -> Vec<&str> {
        self.subcategories
            .iter()
            .filter(|s| s.parent_category_id == parent_id)
            .map(|s| s.name.as_str())
            .collect()
    }
}

/// Result of [`TaxonomySnapshot::resolve_program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramMatch<'a> {
    Found(&'a StudyProgram),
    Missing,
    /// More than one program matches and the row's faculty and institution
    /// do not single one out.
    Ambiguous,
}
