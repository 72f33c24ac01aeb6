//! Core traits for survey-lens abstractions.
//!
//! These traits define the interfaces that concrete store adapters and
//! inference backends must satisfy.

use async_trait::async_trait;
use uuid::Uuid;

use crate::defaults;
use crate::error::Result;
use crate::filter::ResponseFilter;
use crate::models::*;

// =============================================================================
// TAXONOMY STORE TRAITS
// =============================================================================

/// Institution → faculty → study program hierarchy.
///
/// Names are trimmed and must not be empty. Lists are ordered by name.
/// Deleting an entity removes its descendants.
#[async_trait]
pub trait StructureRepository: Send + Sync {
    async fn list_institutions(&self) -> Result<Vec<Institution>>;
    async fn create_institution(&self, name: &str) -> Result<Institution>;
    async fn rename_institution(&self, id: Uuid, name: &str) -> Result<()>;
    async fn delete_institution(&self, id: Uuid) -> Result<()>;

    async fn list_faculties(&self) -> Result<Vec<Faculty>>;
    async fn create_faculty(&self, name: &str, institution_id: Uuid) -> Result<Faculty>;
    /// Rename and/or move a faculty to another institution.
    async fn update_faculty(&self, id: Uuid, name: &str, institution_id: Uuid) -> Result<()>;
    async fn delete_faculty(&self, id: Uuid) -> Result<()>;

    async fn list_programs(&self) -> Result<Vec<StudyProgram>>;
    async fn create_program(&self, name: &str, faculty_id: Uuid) -> Result<StudyProgram>;
    /// Rename and/or move a program to another faculty.
    async fn update_program(&self, id: Uuid, name: &str, faculty_id: Uuid) -> Result<()>;
    /// Refused by the store while responses still reference the program.
    async fn delete_program(&self, id: Uuid) -> Result<()>;
}

/// Parent category → sub-category hierarchy.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_parents(&self) -> Result<Vec<ParentCategory>>;
    async fn create_parent(&self, name: &str, description: Option<&str>) -> Result<ParentCategory>;
    async fn rename_parent(&self, id: Uuid, name: &str) -> Result<()>;
    async fn delete_parent(&self, id: Uuid) -> Result<()>;

    async fn list_subcategories(&self) -> Result<Vec<SubCategory>>;
    async fn create_subcategory(&self, name: &str, parent_id: Uuid) -> Result<SubCategory>;
    async fn update_subcategory(&self, id: Uuid, name: &str, parent_id: Uuid) -> Result<()>;
    async fn delete_subcategory(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// RESPONSE STORE TRAITS
// =============================================================================

/// Request for one page of the review listing.
#[derive(Debug, Clone)]
pub struct ResponsePageRequest {
    pub filter: ResponseFilter,
    /// 1-based page number.
    pub page: i64,
    pub per_page: i64,
}

impl Default for ResponsePageRequest {
    fn default() -> Self {
        Self {
            filter: ResponseFilter::default(),
            page: 1,
            per_page: defaults::PAGE_LIMIT,
        }
    }
}

impl ResponsePageRequest {
    /// Row offset for the requested page. Pages below 1 are treated as 1.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.per_page.max(0)
    }
}

/// Verified survey responses.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert-or-update every row keyed by `original_row_id`.
    /// Returns the number of rows written.
    async fn upsert_bulk(&self, rows: Vec<NewSurveyResponse>) -> Result<usize>;

    async fn list_all(&self) -> Result<Vec<SurveyResponse>>;

    async fn get(&self, id: Uuid) -> Result<SurveyResponse>;

    /// Filtered page ordered by `original_row_id`, with program and faculty names.
    async fn list_page(&self, req: &ResponsePageRequest) -> Result<ResponsePage>;

    /// Responses whose displayed categories intersect `names`.
    async fn filter_by_categories(&self, names: &[String]) -> Result<Vec<SurveyResponse>>;

    async fn update_sentiment(&self, id: Uuid, sentiment: Sentiment) -> Result<()>;

    /// Replace the human-selected categories.
    async fn set_categories(&self, id: Uuid, categories: Vec<String>) -> Result<()>;

    async fn set_suggestion(&self, id: Uuid, is_suggestion: bool) -> Result<()>;
}

/// Review queue for category suggestions.
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// Store suggestions as pending rows.
    async fn enqueue(&self, suggestions: &[CategorySuggestion]) -> Result<Vec<PendingSuggestion>>;

    /// List queued suggestions, newest first, optionally by status.
    async fn list_suggestions(&self, status: Option<SuggestionStatus>) -> Result<Vec<PendingSuggestion>>;

    async fn get_suggestion(&self, id: Uuid) -> Result<PendingSuggestion>;

    async fn set_suggestion_status(&self, id: Uuid, status: SuggestionStatus) -> Result<()>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
