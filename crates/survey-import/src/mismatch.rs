//! Program-name mismatch check run before a commit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use survey_core::{ProgramMatch, TaxonomySnapshot, WorkingRow};

/// Why a row's program name will not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchKind {
    /// No stored program has the normalized name.
    Unknown,
    /// Several programs have it and the row's faculty does not pick one.
    Ambiguous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMismatch {
    pub program_name: String,
    pub kind: MismatchKind,
}

/// Distinct raw program names, in first-seen order, that would stop a
/// commit. Rows whose name normalizes to nothing are ignored here; commit
/// reports them.
pub fn find_mismatches(rows: &[WorkingRow], snapshot: &TaxonomySnapshot) -> Vec<ProgramMismatch> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for row in rows {
        if survey_core::normalize_name(&row.program_name).is_empty() {
            continue;
        }
        let kind = match snapshot.resolve_row_program(row) {
            ProgramMatch::Found(_) => continue,
            ProgramMatch::Missing => MismatchKind::Unknown,
            ProgramMatch::Ambiguous => MismatchKind::Ambiguous,
        };
        if seen.insert((row.program_name.clone(), kind)) {
            found.push(ProgramMismatch {
                program_name: row.program_name.clone(),
                kind,
            });
        }
    }
    found
}
