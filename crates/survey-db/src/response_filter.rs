//! Server-side translation of [`ResponseFilter`] into SQL.
//!
//! The fragments assume `survey_response` is aliased as `r`. Category
//! containment uses array operators on the displayed category set
//! (`COALESCE(human_selected_categories, ai_suggested_categories)`), so the
//! rows returned agree with `FilterContext::matches`.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

use survey_core::ResponseFilter;

use crate::escape_like;

/// Displayed category set of a response row.
pub const DISPLAY_CATEGORIES_SQL: &str =
    "COALESCE(r.human_selected_categories, r.ai_suggested_categories)";

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Uuid(Uuid),
    Bool(bool),
    String(String),
}

/// Bind parameters in order onto a query.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Uuid(id) => query.bind(*id),
            QueryParam::Bool(b) => query.bind(*b),
            QueryParam::String(s) => query.bind(s.clone()),
        };
    }
    query
}

/// Generates a parameterized `WHERE` fragment for a response filter.
///
/// ```rust,ignore
/// let (sql, params) = ResponseFilterQueryBuilder::new(filter, 0).build();
/// // sql: "r.sentiment = $1 AND r.is_suggestion = $2"
/// ```
pub struct ResponseFilterQueryBuilder {
    filter: ResponseFilter,
    param_offset: usize,
}

impl ResponseFilterQueryBuilder {
    /// `param_offset` is the number of parameters already in the query.
    pub fn new(filter: ResponseFilter, param_offset: usize) -> Self {
        Self {
            filter,
            param_offset,
        }
    }

    /// Returns the fragment and its parameters. An empty filter yields `("TRUE", [])`.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut idx = self.param_offset;

        if let Some(faculty_id) = self.filter.faculty_id {
            idx += 1;
            clauses.push(format!(
                "r.study_program_id IN (SELECT sp.id FROM study_program sp WHERE sp.faculty_id = ${})",
                idx
            ));
            params.push(QueryParam::Uuid(faculty_id));
        }

        if let Some(program_id) = self.filter.study_program_id {
            idx += 1;
            clauses.push(format!("r.study_program_id = ${}", idx));
            params.push(QueryParam::Uuid(program_id));
        }

        if let Some(sentiment) = self.filter.sentiment {
            idx += 1;
            clauses.push(format!("r.sentiment = ${}", idx));
            params.push(QueryParam::String(sentiment.to_string()));
        }

        if let Some(flag) = self.filter.is_suggestion {
            idx += 1;
            clauses.push(format!("r.is_suggestion = ${}", idx));
            params.push(QueryParam::Bool(flag));
        }

        if let Some(sub) = &self.filter.sub_category {
            idx += 1;
            clauses.push(format!("${} = ANY({})", idx, DISPLAY_CATEGORIES_SQL));
            params.push(QueryParam::String(sub.clone()));
        } else if let Some(parent_id) = self.filter.parent_category_id {
            // An empty ARRAY(...) never overlaps, so a parent without subs matches nothing.
            idx += 1;
            clauses.push(format!(
                "{} && ARRAY(SELECT sc.name FROM sub_category sc WHERE sc.parent_category_id = ${})",
                DISPLAY_CATEGORIES_SQL, idx
            ));
            params.push(QueryParam::Uuid(parent_id));
        }

        if let Some(term) = self.filter.search_term() {
            idx += 1;
            clauses.push(format!("r.comment_text ILIKE ${}", idx));
            params.push(QueryParam::String(format!("%{}%", escape_like(term))));
        }

        if clauses.is_empty() {
            ("TRUE".to_string(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}
