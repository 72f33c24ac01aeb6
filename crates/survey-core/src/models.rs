//! Core data models for survey-lens.
//!
//! These types are shared across all survey-lens crates and represent
//! the taxonomy, the stored responses and the import-time working rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// STRUCTURE TAXONOMY
// =============================================================================

/// Top level of the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
}

/// A faculty inside an institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: Uuid,
    pub name: String,
    pub institution_id: Uuid,
}

/// A study program inside a faculty. Every stored response points at one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProgram {
    pub id: Uuid,
    pub name: String,
    pub faculty_id: Uuid,
}

// =============================================================================
// CATEGORY TAXONOMY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentCategory {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Leaf category. The same name may appear under several parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub parent_category_id: Uuid,
}

// =============================================================================
// SENTIMENT
// =============================================================================

/// Sentiment label attached to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All values in chart order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Invalid sentiment: {}", s)),
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// A verified survey response as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: Uuid,
    /// External row id from the survey export (`No` column). Unique.
    pub original_row_id: String,
    pub comment_text: String,
    pub sentiment: Sentiment,
    pub ai_suggested_categories: Vec<String>,
    pub human_selected_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reasoning: Option<String>,
    pub is_suggestion: bool,
    pub is_verified: bool,
    pub study_program_id: Uuid,
}

impl SurveyResponse {
    /// Categories shown for this response: the human selection when one
    /// exists, otherwise the AI suggestion. The two are never merged.
    pub fn display_categories(&self) -> &[String] {
        display_categories(
            self.human_selected_categories.as_deref(),
            &self.ai_suggested_categories,
        )
    }
}

/// `human ?? ai` over borrowed category lists.
pub fn display_categories<'a>(human: Option<&'a [String]>, ai: &'a [String]) -> &'a [String] {
    human.unwrap_or(ai)
}

/// Upsert payload for a response, keyed by `original_row_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSurveyResponse {
    pub original_row_id: String,
    pub comment_text: String,
    pub sentiment: Sentiment,
    pub ai_suggested_categories: Vec<String>,
    pub human_selected_categories: Option<Vec<String>>,
    pub ai_reasoning: Option<String>,
    pub is_suggestion: bool,
    pub is_verified: bool,
    pub study_program_id: Uuid,
}

/// Response row joined with its program and faculty names, for the review list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseListItem {
    #[serde(flatten)]
    pub response: SurveyResponse,
    pub program_name: String,
    pub faculty_name: String,
}

/// One page of the review listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePage {
    pub items: Vec<ResponseListItem>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl ResponsePage {
    pub fn total_pages(&self) -> i64 {
        if self.per_page <= 0 {
            return 0;
        }
        (self.total + self.per_page - 1) / self.per_page
    }
}

// =============================================================================
// IMPORT ROWS
// =============================================================================

/// One decoded row of a comment export, before it has been committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingRow {
    /// `No` column.
    pub row_id: String,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    /// `Prodi` (or `Program Studi`) column.
    pub program_name: String,
    pub comment_text: String,
    pub sentiment: Option<Sentiment>,
    pub ai_subcategories: Vec<String>,
    pub human_selected_categories: Option<Vec<String>>,
    #[serde(default)]
    pub ai_reasoning: Option<String>,
    pub is_suggestion: bool,
    pub is_verified: bool,
}

impl WorkingRow {
    pub fn display_categories(&self) -> &[String] {
        display_categories(self.human_selected_categories.as_deref(), &self.ai_subcategories)
    }
}

/// One row of a structure export (`Institusi, Fakultas, Prodi`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRow {
    pub institution: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
}

/// A problem found with one input row. The row is reported, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 1-based data row number (header excluded).
    pub row_number: usize,
    pub message: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row_number, self.message)
    }
}

// =============================================================================
// CATEGORY SUGGESTIONS
// =============================================================================

/// A parent/child category pair proposed by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub parent: String,
    pub child: String,
}

/// Wire shape returned by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPayload {
    pub suggestions: Vec<CategorySuggestion>,
}

/// Review state of a queued suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid suggestion status: {}", s)),
        }
    }
}

/// A suggestion waiting in the review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSuggestion {
    pub id: Uuid,
    pub parent_name: String,
    pub child_name: String,
    pub status: SuggestionStatus,
    pub created_at_utc: DateTime<Utc>,
}
