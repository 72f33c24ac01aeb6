//! Commit verified working rows to the response store.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use survey_core::{NewSurveyResponse, ProgramMatch, ResponseRepository, TaxonomySnapshot, WorkingRow};

/// User-facing result of a commit. Failures are reported here, never as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub success: bool,
    pub message: String,
    pub saved_count: usize,
}

impl CommitOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            saved_count: 0,
        }
    }
}

/// Resolve every row to a study program and upsert them all, or write nothing.
///
/// A program name shared by several faculties resolves through the row's
/// `Fakultas` and `Institusi`; if those do not single one out the commit
/// aborts.
///
/// Rows sharing a `No` collapse to the last occurrence, keeping the position
/// of the first.
pub async fn commit<R>(rows: &[WorkingRow], snapshot: &TaxonomySnapshot, store: &R) -> CommitOutcome
where
    R: ResponseRepository + ?Sized,
{
    if rows.is_empty() {
        return CommitOutcome::failure("No rows to save.");
    }
    let start = Instant::now();

    let mut payload: Vec<NewSurveyResponse> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let program = match snapshot.resolve_row_program(row) {
            ProgramMatch::Found(program) => program,
            ProgramMatch::Missing => {
                warn!(subsystem = "import", component = "commit", row_id = %row.row_id, program = %row.program_name, "Unresolved program, commit aborted");
                return CommitOutcome::failure(format!(
                    "Could not save data. The 'Prodi' named \"{}\" could not be found.",
                    row.program_name
                ));
            }
            ProgramMatch::Ambiguous => {
                warn!(subsystem = "import", component = "commit", row_id = %row.row_id, program = %row.program_name, "Ambiguous program, commit aborted");
                return CommitOutcome::failure(format!(
                    "Could not save data. The 'Prodi' named \"{}\" exists in more than one faculty; \
                     set 'Fakultas' on row \"{}\".",
                    row.program_name, row.row_id
                ));
            }
        };
        let Some(sentiment) = row.sentiment else {
            warn!(subsystem = "import", component = "commit", row_id = %row.row_id, "Row without sentiment, commit aborted");
            return CommitOutcome::failure(format!(
                "Could not save data. Row \"{}\" has no sentiment.",
                row.row_id
            ));
        };

        let response = NewSurveyResponse {
            original_row_id: row.row_id.clone(),
            comment_text: row.comment_text.clone(),
            sentiment,
            ai_suggested_categories: row.ai_subcategories.clone(),
            human_selected_categories: row.human_selected_categories.clone(),
            ai_reasoning: row.ai_reasoning.clone(),
            is_suggestion: row.is_suggestion,
            is_verified: true,
            study_program_id: program.id,
        };
        match positions.get(row.row_id.as_str()) {
            Some(&i) => payload[i] = response,
            None => {
                positions.insert(row.row_id.as_str(), payload.len());
                payload.push(response);
            }
        }
    }

    match store.upsert_bulk(payload).await {
        Ok(saved) => {
            info!(
                subsystem = "import",
                component = "commit",
                op = "commit",
                row_count = rows.len(),
                saved_count = saved,
                duration_ms = start.elapsed().as_millis() as u64,
                "Committed verified responses"
            );
            CommitOutcome {
                success: true,
                message: format!("Successfully saved {} verified responses!", saved),
                saved_count: saved,
            }
        }
        Err(e) => {
            error!(subsystem = "import", component = "commit", error = %e, "Commit failed");
            CommitOutcome::failure(format!("Error saving data: {}", e))
        }
    }
}
