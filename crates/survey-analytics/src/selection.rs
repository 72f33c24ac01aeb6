//! Filter selections given by name.
//!
//! Operators pick faculties, programs and categories by name. A
//! [`FilterSelection`] is resolved against a [`TaxonomySnapshot`] into the
//! id-based [`ResponseFilter`] the engine and the stores understand.

use serde::{Deserialize, Serialize};

use survey_core::{normalize_name, Error, ResponseFilter, Result, Sentiment, TaxonomySnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub faculty: Option<String>,
    pub program: Option<String>,
    pub sentiment: Option<String>,
    pub is_suggestion: Option<bool>,
    pub sub_category: Option<String>,
    pub parent: Option<String>,
    pub search: Option<String>,
}

fn unknown(kind: &str, name: &str) -> Error {
    Error::InvalidInput(format!("unknown {} \"{}\"", kind, name))
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl FilterSelection {
    /// Resolve every named selection. Unknown or ambiguous names are
    /// [`Error::InvalidInput`].
    ///
    /// Faculty, parent and sub-category names compare case-insensitively.
    /// Program names use the same normalization as commit, scoped to the
    /// selected faculty when one is given.
    pub fn resolve(&self, snapshot: &TaxonomySnapshot) -> Result<ResponseFilter> {
        let mut filter = ResponseFilter {
            is_suggestion: self.is_suggestion,
            search: self.search.clone(),
            ..Default::default()
        };

        if let Some(name) = &self.faculty {
            let matches: Vec<_> = snapshot
                .faculties
                .iter()
                .filter(|f| same_name(&f.name, name))
                .collect();
            filter.faculty_id = match matches.as_slice() {
                [] => return Err(unknown("faculty", name)),
                [only] => Some(only.id),
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "faculty \"{}\" exists in more than one institution",
                        name
                    )))
                }
            };
        }

        if let Some(name) = &self.program {
            let wanted = normalize_name(name);
            let matches: Vec<_> = snapshot
                .programs
                .iter()
                .filter(|p| {
                    !wanted.is_empty()
                        && normalize_name(&p.name) == wanted
                        && filter.faculty_id.map_or(true, |fid| p.faculty_id == fid)
                })
                .collect();
            filter.study_program_id = match matches.as_slice() {
                [] => return Err(unknown("program", name)),
                [only] => Some(only.id),
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "program \"{}\" exists in more than one faculty",
                        name
                    )))
                }
            };
        }

        if let Some(value) = &self.sentiment {
            filter.sentiment = Some(value.parse::<Sentiment>().map_err(Error::InvalidInput)?);
        }

        if let Some(name) = &self.sub_category {
            let sub = snapshot
                .subcategories
                .iter()
                .find(|s| same_name(&s.name, name))
                .ok_or_else(|| unknown("sub-category", name))?;
            filter.sub_category = Some(sub.name.clone());
        }

        if let Some(name) = &self.parent {
            let parent = snapshot
                .parents
                .iter()
                .find(|p| same_name(&p.name, name))
                .ok_or_else(|| unknown("parent category", name))?;
            filter.parent_category_id = Some(parent.id);
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{Faculty, ParentCategory, StudyProgram, SubCategory};
    use uuid::Uuid;

    fn snapshot() -> TaxonomySnapshot {
        let inst_a = Uuid::from_u128(1);
        let inst_b = Uuid::from_u128(2);
        TaxonomySnapshot {
            faculties: vec![
                Faculty {
                    id: Uuid::from_u128(10),
                    name: "Teknik".to_string(),
                    institution_id: inst_a,
                },
                Faculty {
                    id: Uuid::from_u128(11),
                    name: "Hukum".to_string(),
                    institution_id: inst_a,
                },
                Faculty {
                    id: Uuid::from_u128(12),
                    name: "Hukum".to_string(),
                    institution_id: inst_b,
                },
            ],
            programs: vec![
                StudyProgram {
                    id: Uuid::from_u128(20),
                    name: "Teknik Informatika".to_string(),
                    faculty_id: Uuid::from_u128(10),
                },
                StudyProgram {
                    id: Uuid::from_u128(21),
                    name: "Ilmu Hukum".to_string(),
                    faculty_id: Uuid::from_u128(11),
                },
                StudyProgram {
                    id: Uuid::from_u128(22),
                    name: "Manajemen".to_string(),
                    faculty_id: Uuid::from_u128(10),
                },
                StudyProgram {
                    id: Uuid::from_u128(23),
                    name: "Manajemen".to_string(),
                    faculty_id: Uuid::from_u128(11),
                },
            ],
            parents: vec![ParentCategory {
                id: Uuid::from_u128(30),
                name: "Infrastructure".to_string(),
                description: None,
            }],
            subcategories: vec![SubCategory {
                id: Uuid::from_u128(40),
                name: "Facilities".to_string(),
                parent_category_id: Uuid::from_u128(30),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_selection_is_empty_filter() {
        let filter = FilterSelection::default().resolve(&snapshot()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_resolves_names_to_ids() {
        let selection = FilterSelection {
            faculty: Some("teknik".to_string()),
            program: Some("teknik-informatika".to_string()),
            sentiment: Some("negative".to_string()),
            sub_category: Some("FACILITIES".to_string()),
            parent: Some("Infrastructure".to_string()),
            search: Some("wifi".to_string()),
            is_suggestion: Some(true),
        };

        let filter = selection.resolve(&snapshot()).unwrap();

        assert_eq!(filter.faculty_id, Some(Uuid::from_u128(10)));
        assert_eq!(filter.study_program_id, Some(Uuid::from_u128(20)));
        assert_eq!(filter.sentiment, Some(Sentiment::Negative));
        assert_eq!(filter.sub_category.as_deref(), Some("Facilities"));
        assert_eq!(filter.parent_category_id, Some(Uuid::from_u128(30)));
        assert_eq!(filter.search.as_deref(), Some("wifi"));
        assert_eq!(filter.is_suggestion, Some(true));
    }

    #[test]
    fn test_program_must_belong_to_selected_faculty() {
        let selection = FilterSelection {
            faculty: Some("Teknik".to_string()),
            program: Some("Ilmu Hukum".to_string()),
            ..Default::default()
        };
        let err = selection.resolve(&snapshot()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("program")));
    }

    #[test]
    fn test_shared_program_name_needs_faculty() {
        let snap = snapshot();
        let bare = FilterSelection {
            program: Some("Manajemen".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bare.resolve(&snap),
            Err(Error::InvalidInput(msg)) if msg.contains("more than one faculty")
        ));

        let scoped = FilterSelection {
            faculty: Some("Teknik".to_string()),
            ..bare
        };
        let filter = scoped.resolve(&snap).unwrap();
        assert_eq!(filter.study_program_id, Some(Uuid::from_u128(22)));
    }

    #[test]
    fn test_unknown_and_ambiguous_names_are_rejected() {
        let snap = snapshot();
        let pick = |f: fn(&mut FilterSelection)| {
            let mut s = FilterSelection::default();
            f(&mut s);
            s.resolve(&snap)
        };

        assert!(matches!(
            pick(|s| s.faculty = Some("Kedokteran".to_string())),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pick(|s| s.faculty = Some("Hukum".to_string())),
            Err(Error::InvalidInput(msg)) if msg.contains("more than one")
        ));
        assert!(matches!(
            pick(|s| s.parent = Some("Finance".to_string())),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pick(|s| s.sub_category = Some("Parking".to_string())),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pick(|s| s.sentiment = Some("angry".to_string())),
            Err(Error::InvalidInput(msg)) if msg == "Invalid sentiment: angry"
        ));
        assert!(matches!(
            pick(|s| s.program = Some("!!!".to_string())),
            Err(Error::InvalidInput(_))
        ));
    }
}
