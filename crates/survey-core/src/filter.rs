//! Response filter predicate.
//!
//! The analytics engine and the in-memory store evaluate filters through
//! [`FilterContext::matches`]. The PostgreSQL adapter translates the same
//! [`ResponseFilter`] into SQL with identical semantics.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Sentiment, SurveyResponse};
use crate::snapshot::TaxonomySnapshot;

/// Cascading filter selections. Every field is optional; `None` means "all".
/// Set fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_program_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suggestion: Option<bool>,
    /// Sub-category name. Disables the parent filter when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<Uuid>,
    /// Case-insensitive substring of the comment text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ResponseFilter {
    /// Search term as typed, `None` when blank. Surrounding spaces are part
    /// of the substring.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Parent filter, only when no sub-category filter is active.
    pub fn effective_parent(&self) -> Option<Uuid> {
        if self.sub_category.is_some() {
            None
        } else {
            self.parent_category_id
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faculty_id.is_none()
            && self.study_program_id.is_none()
            && self.sentiment.is_none()
            && self.is_suggestion.is_none()
            && self.sub_category.is_none()
            && self.parent_category_id.is_none()
            && self.search_term().is_none()
    }
}

/// A filter with its taxonomy lookups resolved once, ready to test many rows.
#[derive(Debug, Clone)]
pub struct FilterContext {
    filter: ResponseFilter,
    faculty_programs: Option<HashSet<Uuid>>,
    parent_subs: Option<HashSet<String>>,
    search_lower: Option<String>,
}

impl FilterContext {
    pub fn new(filter: &ResponseFilter, snapshot: &TaxonomySnapshot) -> Self {
        let faculty_programs = filter
            .faculty_id
            .map(|fid| snapshot.program_ids_in_faculty(fid).into_iter().collect());
        let parent_subs = filter.effective_parent().map(|pid| {
            snapshot
                .subcategory_names(pid)
                .into_iter()
                .map(String::from)
                .collect()
        });
        Self {
            filter: filter.clone(),
            faculty_programs,
            parent_subs,
            search_lower: filter.search_term().map(str::to_lowercase),
        }
    }

    pub fn filter(&self) -> &ResponseFilter {
        &self.filter
    }

    pub fn matches(&self, response: &SurveyResponse) -> bool {
        if let Some(programs) = &self.faculty_programs {
            if !programs.contains(&response.study_program_id) {
                return false;
            }
        }
        if let Some(program_id) = self.filter.study_program_id {
            if response.study_program_id != program_id {
                return false;
            }
        }
        if let Some(sentiment) = self.filter.sentiment {
            if response.sentiment != sentiment {
                return false;
            }
        }
        if let Some(flag) = self.filter.is_suggestion {
            if response.is_suggestion != flag {
                return false;
            }
        }

        let categories = response.display_categories();
        if let Some(sub) = &self.filter.sub_category {
            if !categories.iter().any(|c| c == sub) {
                return false;
            }
        } else if let Some(subs) = &self.parent_subs {
            if !categories.iter().any(|c| subs.contains(c)) {
                return false;
            }
        }

        if let Some(term) = &self.search_lower {
            if !response.comment_text.to_lowercase().contains(term.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    const FAC_A: Uuid = Uuid::from_u128(100);
    const FAC_B: Uuid = Uuid::from_u128(101);
    const PROG_A1: Uuid = Uuid::from_u128(200);
    const PROG_B1: Uuid = Uuid::from_u128(201);
    const INFRA: Uuid = Uuid::from_u128(300);
    const EMPTY_PARENT: Uuid = Uuid::from_u128(301);

    fn snapshot() -> TaxonomySnapshot {
        let inst = Uuid::from_u128(1);
        TaxonomySnapshot {
            institutions: vec![Institution {
                id: inst,
                name: "Uni".into(),
            }],
            faculties: vec![
                Faculty {
                    id: FAC_A,
                    name: "Engineering".into(),
                    institution_id: inst,
                },
                Faculty {
                    id: FAC_B,
                    name: "Medicine".into(),
                    institution_id: inst,
                },
            ],
            programs: vec![
                StudyProgram {
                    id: PROG_A1,
                    name: "Informatics".into(),
                    faculty_id: FAC_A,
                },
                StudyProgram {
                    id: PROG_B1,
                    name: "Nursing".into(),
                    faculty_id: FAC_B,
                },
            ],
            parents: vec![
                ParentCategory {
                    id: INFRA,
                    name: "Infrastructure".into(),
                    description: None,
                },
                ParentCategory {
                    id: EMPTY_PARENT,
                    name: "Empty".into(),
                    description: None,
                },
            ],
            subcategories: vec![SubCategory {
                id: Uuid::from_u128(400),
                name: "Facilities".into(),
                parent_category_id: INFRA,
            }],
        }
    }

    fn response(program: Uuid, sentiment: Sentiment, cats: &[&str], text: &str) -> SurveyResponse {
        SurveyResponse {
            id: Uuid::now_v7(),
            original_row_id: "1".into(),
            comment_text: text.into(),
            sentiment,
            ai_suggested_categories: cats.iter().map(|c| c.to_string()).collect(),
            human_selected_categories: None,
            ai_reasoning: None,
            is_suggestion: false,
            is_verified: true,
            study_program_id: program,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let ctx = FilterContext::new(&ResponseFilter::default(), &snapshot());
        assert!(ctx.matches(&response(PROG_A1, Sentiment::Positive, &[], "")));
        assert!(ResponseFilter::default().is_empty());
    }

    #[test]
    fn test_faculty_restricts_to_its_programs() {
        let filter = ResponseFilter {
            faculty_id: Some(FAC_A),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        assert!(ctx.matches(&response(PROG_A1, Sentiment::Positive, &[], "")));
        assert!(!ctx.matches(&response(PROG_B1, Sentiment::Positive, &[], "")));
    }

    #[test]
    fn test_program_outside_faculty_matches_nothing() {
        let filter = ResponseFilter {
            faculty_id: Some(FAC_A),
            study_program_id: Some(PROG_B1),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        assert!(!ctx.matches(&response(PROG_B1, Sentiment::Positive, &[], "")));
    }

    #[test]
    fn test_sub_category_overrides_parent() {
        let filter = ResponseFilter {
            sub_category: Some("Parking".into()),
            parent_category_id: Some(INFRA),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        assert!(ctx.matches(&response(PROG_A1, Sentiment::Neutral, &["Parking"], "")));
        assert!(!ctx.matches(&response(PROG_A1, Sentiment::Neutral, &["Facilities"], "")));
    }

    #[test]
    fn test_parent_without_subcategories_matches_nothing() {
        let filter = ResponseFilter {
            parent_category_id: Some(EMPTY_PARENT),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        assert!(!ctx.matches(&response(PROG_A1, Sentiment::Neutral, &["Facilities"], "")));
    }

    #[test]
    fn test_parent_uses_display_categories() {
        let filter = ResponseFilter {
            parent_category_id: Some(INFRA),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        let mut r = response(PROG_A1, Sentiment::Neutral, &["Facilities"], "");
        assert!(ctx.matches(&r));
        r.human_selected_categories = Some(vec!["Staff".into()]);
        assert!(!ctx.matches(&r));
    }

    #[test]
    fn test_search_is_case_insensitive_and_blank_is_ignored() {
        let snap = snapshot();
        let r = response(PROG_A1, Sentiment::Negative, &[], "The WiFi is slow");
        let hit = ResponseFilter {
            search: Some("wifi".into()),
            ..Default::default()
        };
        let blank = ResponseFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(FilterContext::new(&hit, &snap).matches(&r));
        assert!(FilterContext::new(&blank, &snap).matches(&r));
        assert!(blank.is_empty());
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let snap = snapshot();
        let spaced = ResponseFilter {
            search: Some(" lab ".into()),
            ..Default::default()
        };
        let ctx = FilterContext::new(&spaced, &snap);
        assert!(ctx.matches(&response(PROG_A1, Sentiment::Neutral, &[], "the lab room")));
        assert!(!ctx.matches(&response(PROG_A1, Sentiment::Neutral, &[], "laboratory")));
    }

    #[test]
    fn test_sentiment_and_suggestion_flag() {
        let filter = ResponseFilter {
            sentiment: Some(Sentiment::Negative),
            is_suggestion: Some(true),
            ..Default::default()
        };
        let ctx = FilterContext::new(&filter, &snapshot());
        let mut r = response(PROG_A1, Sentiment::Negative, &[], "");
        assert!(!ctx.matches(&r));
        r.is_suggestion = true;
        assert!(ctx.matches(&r));
        r.sentiment = Sentiment::Positive;
        assert!(!ctx.matches(&r));
    }
}
