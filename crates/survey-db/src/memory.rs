//! In-memory store adapter.
//!
//! Implements every repository trait over plain vectors behind a mutex. It
//! mirrors the PostgreSQL schema rules: names ordered on list, cascading
//! deletes down each hierarchy, responses restricting program deletion and
//! `original_row_id` as the upsert key. Used by tests and dry runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use survey_core::{
    display_categories, CategoryRepository, CategorySuggestion, Error, Faculty, FilterContext,
    Institution, NewSurveyResponse, ParentCategory, PendingSuggestion, ResponseListItem,
    ResponsePage, ResponsePageRequest, ResponseRepository, Result, Sentiment, StructureRepository,
    StudyProgram, SubCategory, SuggestionRepository, SuggestionStatus, SurveyResponse,
    TaxonomySnapshot,
};

use crate::validate_name;

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: TaxonomySnapshot,
    responses: Vec<SurveyResponse>,
    suggestions: Vec<PendingSuggestion>,
    /// Remaining successful writes before injected failures start.
    writes_left: Option<usize>,
    writes: usize,
}

impl MemoryState {
    fn begin_write(&mut self) -> Result<()> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(Error::Internal("injected store failure".to_string()));
            }
            *left -= 1;
        }
        self.writes += 1;
        Ok(())
    }

    /// Responses restrict program deletion.
    fn ensure_unreferenced(&self, program_ids: &HashSet<Uuid>) -> Result<()> {
        match self
            .responses
            .iter()
            .find(|r| program_ids.contains(&r.study_program_id))
        {
            Some(r) => Err(Error::InvalidInput(format!(
                "study program {} is still referenced by survey responses",
                r.study_program_id
            ))),
            None => Ok(()),
        }
    }
}

fn sorted_by_name<T: Clone>(items: &[T], key: impl Fn(&T) -> (&str, Uuid)) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| key(a).cmp(&key(b)));
    out
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    /// Allow `n` more successful writes, then fail every write after that.
    pub fn fail_writes_after(&self, n: usize) -> Result<()> {
        self.state()?.writes_left = Some(n);
        Ok(())
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) -> Result<()> {
        self.state()?.writes_left = None;
        Ok(())
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> Result<usize> {
        Ok(self.state()?.writes)
    }

    /// Copy of the stored taxonomy.
    pub fn snapshot(&self) -> Result<TaxonomySnapshot> {
        Ok(self.state()?.snapshot.clone())
    }
}

#[async_trait]
impl StructureRepository for MemoryStore {
    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let state = self.state()?;
        Ok(sorted_by_name(&state.snapshot.institutions, |i| (i.name.as_str(), i.id)))
    }

    async fn create_institution(&self, name: &str) -> Result<Institution> {
        let name = validate_name(name, "institution")?;
        let mut state = self.state()?;
        state.begin_write()?;
        let institution = Institution {
            id: Uuid::now_v7(),
            name: name.to_string(),
        };
        state.snapshot.institutions.push(institution.clone());
        Ok(institution)
    }

    async fn rename_institution(&self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name, "institution")?;
        let mut state = self.state()?;
        state.begin_write()?;
        let institution = state
            .snapshot
            .institutions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("institution {}", id)))?;
        institution.name = name.to_string();
        Ok(())
    }

    async fn delete_institution(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        if !state.snapshot.institutions.iter().any(|i| i.id == id) {
            return Err(Error::NotFound(format!("institution {}", id)));
        }
        let faculty_ids: HashSet<Uuid> = state
            .snapshot
            .faculties
            .iter()
            .filter(|f| f.institution_id == id)
            .map(|f| f.id)
            .collect();
        let program_ids: HashSet<Uuid> = state
            .snapshot
            .programs
            .iter()
            .filter(|p| faculty_ids.contains(&p.faculty_id))
            .map(|p| p.id)
            .collect();
        state.ensure_unreferenced(&program_ids)?;
        state.begin_write()?;
        state.snapshot.programs.retain(|p| !program_ids.contains(&p.id));
        state.snapshot.faculties.retain(|f| f.institution_id != id);
        state.snapshot.institutions.retain(|i| i.id != id);
        Ok(())
    }

    async fn list_faculties(&self) -> Result<Vec<Faculty>> {
        let state = self.state()?;
        Ok(sorted_by_name(&state.snapshot.faculties, |f| (f.name.as_str(), f.id)))
    }

    async fn create_faculty(&self, name: &str, institution_id: Uuid) -> Result<Faculty> {
        let name = validate_name(name, "faculty")?;
        let mut state = self.state()?;
        if !state.snapshot.institutions.iter().any(|i| i.id == institution_id) {
            return Err(Error::NotFound(format!("institution {}", institution_id)));
        }
        state.begin_write()?;
        let faculty = Faculty {
            id: Uuid::now_v7(),
            name: name.to_string(),
            institution_id,
        };
        state.snapshot.faculties.push(faculty.clone());
        Ok(faculty)
    }

    async fn update_faculty(&self, id: Uuid, name: &str, institution_id: Uuid) -> Result<()> {
        let name = validate_name(name, "faculty")?;
        let mut state = self.state()?;
        if !state.snapshot.institutions.iter().any(|i| i.id == institution_id) {
            return Err(Error::NotFound(format!("institution {}", institution_id)));
        }
        state.begin_write()?;
        let faculty = state
            .snapshot
            .faculties
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(format!("faculty {}", id)))?;
        faculty.name = name.to_string();
        faculty.institution_id = institution_id;
        Ok(())
    }

    async fn delete_faculty(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        if !state.snapshot.faculties.iter().any(|f| f.id == id) {
            return Err(Error::NotFound(format!("faculty {}", id)));
        }
        let program_ids: HashSet<Uuid> = state
            .snapshot
            .programs
            .iter()
            .filter(|p| p.faculty_id == id)
            .map(|p| p.id)
            .collect();
        state.ensure_unreferenced(&program_ids)?;
        state.begin_write()?;
        state.snapshot.programs.retain(|p| !program_ids.contains(&p.id));
        state.snapshot.faculties.retain(|f| f.id != id);
        Ok(())
    }

    async fn list_programs(&self) -> Result<Vec<StudyProgram>> {
        let state = self.state()?;
        Ok(sorted_by_name(&state.snapshot.programs, |p| (p.name.as_str(), p.id)))
    }

    async fn create_program(&self, name: &str, faculty_id: Uuid) -> Result<StudyProgram> {
        let name = validate_name(name, "study program")?;
        let mut state = self.state()?;
        if !state.snapshot.faculties.iter().any(|f| f.id == faculty_id) {
            return Err(Error::NotFound(format!("faculty {}", faculty_id)));
        }
        state.begin_write()?;
        let program = StudyProgram {
            id: Uuid::now_v7(),
            name: name.to_string(),
            faculty_id,
        };
        state.snapshot.programs.push(program.clone());
        Ok(program)
    }

    async fn update_program(&self, id: Uuid, name: &str, faculty_id: Uuid) -> Result<()> {
        let name = validate_name(name, "study program")?;
        let mut state = self.state()?;
        if !state.snapshot.faculties.iter().any(|f| f.id == faculty_id) {
            return Err(Error::NotFound(format!("faculty {}", faculty_id)));
        }
        state.begin_write()?;
        let program = state
            .snapshot
            .programs
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("study program {}", id)))?;
        program.name = name.to_string();
        program.faculty_id = faculty_id;
        Ok(())
    }

    async fn delete_program(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        if !state.snapshot.programs.iter().any(|p| p.id == id) {
            return Err(Error::NotFound(format!("study program {}", id)));
        }
        state.ensure_unreferenced(&HashSet::from([id]))?;
        state.begin_write()?;
        state.snapshot.programs.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list_parents(&self) -> Result<Vec<ParentCategory>> {
        let state = self.state()?;
        Ok(sorted_by_name(&state.snapshot.parents, |p| (p.name.as_str(), p.id)))
    }

    async fn create_parent(&self, name: &str, description: Option<&str>) -> Result<ParentCategory> {
        let name = validate_name(name, "parent category")?;
        let mut state = self.state()?;
        state.begin_write()?;
        let parent = ParentCategory {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
        };
        state.snapshot.parents.push(parent.clone());
        Ok(parent)
    }

    async fn rename_parent(&self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name, "parent category")?;
        let mut state = self.state()?;
        state.begin_write()?;
        let parent = state
            .snapshot
            .parents
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("parent category {}", id)))?;
        parent.name = name.to_string();
        Ok(())
    }

    async fn delete_parent(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        if !state.snapshot.parents.iter().any(|p| p.id == id) {
            return Err(Error::NotFound(format!("parent category {}", id)));
        }
        state.begin_write()?;
        state.snapshot.subcategories.retain(|s| s.parent_category_id != id);
        state.snapshot.parents.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_subcategories(&self) -> Result<Vec<SubCategory>> {
        let state = self.state()?;
        Ok(sorted_by_name(&state.snapshot.subcategories, |s| (s.name.as_str(), s.id)))
    }

    async fn create_subcategory(&self, name: &str, parent_id: Uuid) -> Result<SubCategory> {
        let name = validate_name(name, "sub-category")?;
        let mut state = self.state()?;
        if !state.snapshot.parents.iter().any(|p| p.id == parent_id) {
            return Err(Error::NotFound(format!("parent category {}", parent_id)));
        }
        state.begin_write()?;
        let sub = SubCategory {
            id: Uuid::now_v7(),
            name: name.to_string(),
            parent_category_id: parent_id,
        };
        state.snapshot.subcategories.push(sub.clone());
        Ok(sub)
    }

    async fn update_subcategory(&self, id: Uuid, name: &str, parent_id: Uuid) -> Result<()> {
        let name = validate_name(name, "sub-category")?;
        let mut state = self.state()?;
        if !state.snapshot.parents.iter().any(|p| p.id == parent_id) {
            return Err(Error::NotFound(format!("parent category {}", parent_id)));
        }
        state.begin_write()?;
        let sub = state
            .snapshot
            .subcategories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("sub-category {}", id)))?;
        sub.name = name.to_string();
        sub.parent_category_id = parent_id;
        Ok(())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        if !state.snapshot.subcategories.iter().any(|s| s.id == id) {
            return Err(Error::NotFound(format!("sub-category {}", id)));
        }
        state.begin_write()?;
        state.snapshot.subcategories.retain(|s| s.id != id);
        Ok(())
    }
}

fn sorted_responses(mut responses: Vec<SurveyResponse>) -> Vec<SurveyResponse> {
    responses.sort_by(|a, b| a.original_row_id.cmp(&b.original_row_id));
    responses
}

#[async_trait]
impl ResponseRepository for MemoryStore {
    async fn upsert_bulk(&self, rows: Vec<NewSurveyResponse>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut state = self.state()?;
        if let Some(missing) = rows
            .iter()
            .find(|r| !state.snapshot.programs.iter().any(|p| p.id == r.study_program_id))
        {
            return Err(Error::NotFound(format!(
                "study program {}",
                missing.study_program_id
            )));
        }
        state.begin_write()?;

        let count = rows.len();
        for row in rows {
            let existing = state
                .responses
                .iter()
                .position(|r| r.original_row_id == row.original_row_id);
            let id = existing
                .map(|i| state.responses[i].id)
                .unwrap_or_else(Uuid::now_v7);
            let response = SurveyResponse {
                id,
                original_row_id: row.original_row_id,
                comment_text: row.comment_text,
                sentiment: row.sentiment,
                ai_suggested_categories: row.ai_suggested_categories,
                human_selected_categories: row.human_selected_categories,
                ai_reasoning: row.ai_reasoning,
                is_suggestion: row.is_suggestion,
                is_verified: row.is_verified,
                study_program_id: row.study_program_id,
            };
            match existing {
                Some(i) => state.responses[i] = response,
                None => state.responses.push(response),
            }
        }
        Ok(count)
    }

    async fn list_all(&self) -> Result<Vec<SurveyResponse>> {
        Ok(sorted_responses(self.state()?.responses.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<SurveyResponse> {
        self.state()?
            .responses
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("survey response {}", id)))
    }

    async fn list_page(&self, req: &ResponsePageRequest) -> Result<ResponsePage> {
        let state = self.state()?;
        let ctx = FilterContext::new(&req.filter, &state.snapshot);
        let matching = sorted_responses(
            state
                .responses
                .iter()
                .filter(|r| ctx.matches(r))
                .cloned()
                .collect(),
        );
        let total = matching.len() as i64;

        let items = matching
            .into_iter()
            .skip(req.offset() as usize)
            .take(req.per_page.max(0) as usize)
            .filter_map(|response| {
                let program = state.snapshot.program(response.study_program_id)?;
                let faculty = state.snapshot.faculty(program.faculty_id)?;
                Some(ResponseListItem {
                    program_name: program.name.clone(),
                    faculty_name: faculty.name.clone(),
                    response,
                })
            })
            .collect();

        Ok(ResponsePage {
            items,
            total,
            page: req.page.max(1),
            per_page: req.per_page,
        })
    }

    async fn filter_by_categories(&self, names: &[String]) -> Result<Vec<SurveyResponse>> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let state = self.state()?;
        Ok(sorted_responses(
            state
                .responses
                .iter()
                .filter(|r| {
                    display_categories(r.human_selected_categories.as_deref(), &r.ai_suggested_categories)
                        .iter()
                        .any(|c| wanted.contains(c.as_str()))
                })
                .cloned()
                .collect(),
        ))
    }

    async fn update_sentiment(&self, id: Uuid, sentiment: Sentiment) -> Result<()> {
        self.update_response(id, |r| r.sentiment = sentiment)
    }

    async fn set_categories(&self, id: Uuid, categories: Vec<String>) -> Result<()> {
        self.update_response(id, move |r| r.human_selected_categories = Some(categories))
    }

    async fn set_suggestion(&self, id: Uuid, is_suggestion: bool) -> Result<()> {
        self.update_response(id, |r| r.is_suggestion = is_suggestion)
    }
}

impl MemoryStore {
    fn update_response(&self, id: Uuid, apply: impl FnOnce(&mut SurveyResponse)) -> Result<()> {
        let mut state = self.state()?;
        let idx = state
            .responses
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("survey response {}", id)))?;
        state.begin_write()?;
        apply(&mut state.responses[idx]);
        Ok(())
    }
}

#[async_trait]
impl SuggestionRepository for MemoryStore {
    async fn enqueue(&self, suggestions: &[CategorySuggestion]) -> Result<Vec<PendingSuggestion>> {
        let mut state = self.state()?;
        state.begin_write()?;
        let queued: Vec<PendingSuggestion> = suggestions
            .iter()
            .map(|s| PendingSuggestion {
                id: Uuid::now_v7(),
                parent_name: s.parent.clone(),
                child_name: s.child.clone(),
                status: SuggestionStatus::Pending,
                created_at_utc: Utc::now(),
            })
            .collect();
        state.suggestions.extend(queued.iter().cloned());
        Ok(queued)
    }

    async fn list_suggestions(&self, status: Option<SuggestionStatus>) -> Result<Vec<PendingSuggestion>> {
        let state = self.state()?;
        let mut out: Vec<PendingSuggestion> = state
            .suggestions
            .iter()
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.created_at_utc, b.id).cmp(&(a.created_at_utc, a.id)));
        Ok(out)
    }

    async fn get_suggestion(&self, id: Uuid) -> Result<PendingSuggestion> {
        self.state()?
            .suggestions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("suggestion {}", id)))
    }

    async fn set_suggestion_status(&self, id: Uuid, status: SuggestionStatus) -> Result<()> {
        let mut state = self.state()?;
        let idx = state
            .suggestions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("suggestion {}", id)))?;
        state.begin_write()?;
        state.suggestions[idx].status = status;
        Ok(())
    }
}
