//! Hierarchical import reconciliation.
//!
//! Structure rows are matched against the institution → faculty → study
//! program hierarchy by exact trimmed name, scoped by parent. Missing
//! entities are created through the store and added to a working copy of the
//! snapshot so later rows in the same batch see them.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use survey_core::{trimmed, Result, RowIssue, StructureRepository, StructureRow, TaxonomySnapshot};

/// Result of a reconciliation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Snapshot including every entity created by this batch.
    pub snapshot: TaxonomySnapshot,
    /// Number of study programs created.
    pub new_items: usize,
    pub issues: Vec<RowIssue>,
}

/// Reconcile rows in file order. A store failure stops the batch and is
/// returned unchanged; entities created before it stay in place.
pub async fn reconcile<S>(
    rows: &[StructureRow],
    snapshot: &TaxonomySnapshot,
    store: &S,
) -> Result<ReconcileOutcome>
where
    S: StructureRepository + ?Sized,
{
    let start = Instant::now();
    let mut working = snapshot.clone();
    let mut new_items = 0usize;
    let mut issues = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        let Some(inst_name) = trimmed(row.institution.as_deref()) else {
            trace!(subsystem = "import", component = "reconcile", row_number, "Row without institution skipped");
            continue;
        };

        let institution_id = match working.institution_named(inst_name) {
            Some(existing) => existing.id,
            None => {
                let created = store.create_institution(inst_name).await.inspect_err(|e| {
                    error!(subsystem = "import", component = "reconcile", row_number, error = %e, "Institution create failed");
                })?;
                debug!(subsystem = "import", component = "reconcile", name = inst_name, "Created institution");
                let id = created.id;
                working.institutions.push(created);
                id
            }
        };

        let Some(fac_name) = trimmed(row.faculty.as_deref()) else {
            issues.push(RowIssue {
                row_number,
                message: "missing faculty".to_string(),
            });
            continue;
        };

        let faculty_id = match working.faculty_named(fac_name, institution_id) {
            Some(existing) => existing.id,
            None => {
                let created = store
                    .create_faculty(fac_name, institution_id)
                    .await
                    .inspect_err(|e| {
                        error!(subsystem = "import", component = "reconcile", row_number, error = %e, "Faculty create failed");
                    })?;
                debug!(subsystem = "import", component = "reconcile", name = fac_name, "Created faculty");
                let id = created.id;
                working.faculties.push(created);
                id
            }
        };

        let Some(prog_name) = trimmed(row.program.as_deref()) else {
            issues.push(RowIssue {
                row_number,
                message: "missing program".to_string(),
            });
            continue;
        };

        if working.program_named(prog_name, faculty_id).is_none() {
            let created = store
                .create_program(prog_name, faculty_id)
                .await
                .inspect_err(|e| {
                    error!(subsystem = "import", component = "reconcile", row_number, error = %e, "Program create failed");
                })?;
            debug!(subsystem = "import", component = "reconcile", name = prog_name, "Created study program");
            working.programs.push(created);
            new_items += 1;
        }
    }

    info!(
        subsystem = "import",
        component = "reconcile",
        op = "reconcile",
        row_count = rows.len(),
        created_count = new_items,
        issue_count = issues.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Structure import reconciled"
    );

    Ok(ReconcileOutcome {
        snapshot: working,
        new_items,
        issues,
    })
}
