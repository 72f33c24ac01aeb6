//! Verification workspace: the imported rows a human reviews before commit.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use survey_core::defaults::SUGGESTION_COMMENT_LIMIT;
use survey_core::{
    Error, ResponseRepository, Result, RowIssue, Sentiment, TaxonomySnapshot, WorkingRow,
};

use crate::commit::{commit, CommitOutcome};
use crate::csv_format::{parse_comment_file, ParsedComments};
use crate::mismatch::{find_mismatches, ProgramMismatch};

/// Add `name` to the list, or remove it when already present.
pub fn toggle_name(categories: &mut Vec<String>, name: &str) {
    if let Some(pos) = categories.iter().position(|c| c == name) {
        categories.remove(pos);
    } else {
        categories.push(name.to_string());
    }
}

/// Holds the busy flag for as long as it lives.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Working rows plus the file they came from. Clones share one busy flag,
/// so edits through any clone are refused while a commit runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationWorkspace {
    pub source_name: String,
    rows: Vec<WorkingRow>,
    #[serde(default)]
    issues: Vec<RowIssue>,
    #[serde(skip)]
    busy: Arc<AtomicBool>,
}

impl VerificationWorkspace {
    pub fn new(source_name: impl Into<String>, parsed: ParsedComments) -> Self {
        Self {
            source_name: source_name.into(),
            rows: parsed.rows,
            issues: parsed.issues,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Decode a comment export into a fresh workspace.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parsed = parse_comment_file(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(
            subsystem = "import",
            component = "workspace",
            op = "load",
            source = %source,
            row_count = parsed.rows.len(),
            "Loaded comment file"
        );
        Ok(Self::new(source, parsed))
    }

    /// Restore a saved session.
    pub fn read_session(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist the session as JSON.
    pub fn write_session(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn rows(&self) -> &[WorkingRow] {
        &self.rows
    }

    /// Problems found while decoding the file.
    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the busy flag, failing when another operation holds it.
    pub fn begin_busy(&self) -> Result<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy("a commit is in progress".to_string()))?;
        Ok(BusyGuard {
            flag: Arc::clone(&self.busy),
        })
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut WorkingRow> {
        if self.is_busy() {
            return Err(Error::Busy("a commit is in progress".to_string()));
        }
        let len = self.rows.len();
        self.rows.get_mut(index).ok_or_else(|| {
            Error::InvalidInput(format!("row index {} out of range (0..{})", index, len))
        })
    }

    /// Toggle a category on a row. The first edit starts from the AI suggestion.
    pub fn toggle_category(&mut self, index: usize, name: &str) -> Result<&[String]> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("category name must not be empty".to_string()));
        }
        let row = self.row_mut(index)?;
        let categories = row
            .human_selected_categories
            .get_or_insert_with(|| row.ai_subcategories.clone());
        toggle_name(categories, name);
        Ok(categories.as_slice())
    }

    pub fn set_sentiment(&mut self, index: usize, sentiment: Sentiment) -> Result<()> {
        self.row_mut(index)?.sentiment = Some(sentiment);
        Ok(())
    }

    pub fn set_suggestion_flag(&mut self, index: usize, is_suggestion: bool) -> Result<()> {
        self.row_mut(index)?.is_suggestion = is_suggestion;
        Ok(())
    }

    /// Flip the suggestion flag, returning the new value.
    pub fn toggle_suggestion_flag(&mut self, index: usize) -> Result<bool> {
        let row = self.row_mut(index)?;
        row.is_suggestion = !row.is_suggestion;
        Ok(row.is_suggestion)
    }

    /// Up to 50 non-empty comments, for the suggestion service.
    pub fn comments(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.comment_text.trim())
            .filter(|c| !c.is_empty())
            .take(SUGGESTION_COMMENT_LIMIT)
            .collect()
    }

    /// Program names that match no stored program, or more than one.
    pub fn mismatches(&self, snapshot: &TaxonomySnapshot) -> Vec<ProgramMismatch> {
        find_mismatches(&self.rows, snapshot)
    }

    /// `No` values of rows that still lack a sentiment.
    pub fn rows_missing_sentiment(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.sentiment.is_none())
            .map(|r| r.row_id.as_str())
            .collect()
    }

    /// Commit all rows while holding the busy flag.
    pub async fn commit<R>(&self, snapshot: &TaxonomySnapshot, store: &R) -> Result<CommitOutcome>
    where
        R: ResponseRepository + ?Sized,
    {
        let _guard = self.begin_busy()?;
        let outcome = commit(&self.rows, snapshot, store).await;
        info!(
            subsystem = "import",
            component = "workspace",
            op = "commit",
            source = %self.source_name,
            success = outcome.success,
            saved_count = outcome.saved_count,
            "Workspace commit finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> VerificationWorkspace {
        let row = |id: &str, comment: &str, ai: &[&str]| WorkingRow {
            row_id: id.into(),
            institution: None,
            faculty: None,
            program_name: "Informatika".into(),
            comment_text: comment.into(),
            sentiment: None,
            ai_subcategories: ai.iter().map(|c| c.to_string()).collect(),
            human_selected_categories: None,
            ai_reasoning: None,
            is_suggestion: false,
            is_verified: false,
        };
        VerificationWorkspace::new(
            "export.csv",
            ParsedComments {
                rows: vec![row("1", "Dosen ramah", &["Staff", "Facilities"]), row("2", "  ", &[])],
                issues: vec![],
            },
        )
    }

    #[test]
    fn test_toggle_starts_from_ai_suggestion() {
        let mut ws = workspace();
        let cats = ws.toggle_category(0, "Facilities").unwrap().to_vec();
        assert_eq!(cats, vec!["Staff".to_string()]);
        assert_eq!(ws.rows()[0].ai_subcategories.len(), 2);

        let cats = ws.toggle_category(0, "Parking").unwrap().to_vec();
        assert_eq!(cats, vec!["Staff".to_string(), "Parking".to_string()]);
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let mut ws = workspace();
        ws.toggle_category(0, "Parking").unwrap();
        ws.toggle_category(0, "Parking").unwrap();
        assert_eq!(
            ws.rows()[0].human_selected_categories.as_deref(),
            Some(&["Staff".to_string(), "Facilities".to_string()][..])
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let mut ws = workspace();
        let err = ws.set_sentiment(9, Sentiment::Positive).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_edits_rejected_while_busy() {
        let mut ws = workspace();
        let other = ws.clone();
        let guard = other.begin_busy().unwrap();

        assert!(matches!(ws.toggle_suggestion_flag(0), Err(Error::Busy(_))));
        assert!(matches!(ws.begin_busy(), Err(Error::Busy(_))));

        drop(guard);
        assert!(ws.toggle_suggestion_flag(0).unwrap());
    }

    #[test]
    fn test_comments_skip_blank() {
        assert_eq!(workspace().comments(), vec!["Dosen ramah"]);
    }

    #[test]
    fn test_rows_missing_sentiment() {
        let mut ws = workspace();
        ws.set_sentiment(1, Sentiment::Neutral).unwrap();
        assert_eq!(ws.rows_missing_sentiment(), vec!["1"]);
    }

    #[test]
    fn test_session_json_roundtrip_drops_busy_state() {
        let mut ws = workspace();
        ws.toggle_category(0, "Staff").unwrap();
        let _guard = ws.begin_busy().unwrap();

        let json = serde_json::to_string(&ws).unwrap();
        let restored: VerificationWorkspace = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_busy());
        assert_eq!(restored.rows(), ws.rows());
    }
}
