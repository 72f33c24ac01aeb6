//! Survey response repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use survey_core::{
    Error, NewSurveyResponse, ResponseListItem, ResponsePage, ResponsePageRequest,
    ResponseRepository, Result, Sentiment, SurveyResponse,
};

use crate::expect_affected;
use crate::response_filter::{bind_params, ResponseFilterQueryBuilder};

const RESPONSE_COLUMNS: &str = "r.id, r.original_row_id, r.comment_text, r.sentiment, \
     r.ai_suggested_categories, r.human_selected_categories, r.ai_reasoning, \
     r.is_suggestion, r.is_verified, r.study_program_id";

/// PostgreSQL implementation of ResponseRepository.
pub struct PgResponseRepository {
    pool: Pool<Postgres>,
}

impl PgResponseRepository {
    /// Create a new PgResponseRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<SurveyResponse> {
        let sentiment: String = row.get("sentiment");
        let sentiment = sentiment
            .parse::<Sentiment>()
            .map_err(Error::Internal)?;
        Ok(SurveyResponse {
            id: row.get("id"),
            original_row_id: row.get("original_row_id"),
            comment_text: row.get("comment_text"),
            sentiment,
            ai_suggested_categories: row.get("ai_suggested_categories"),
            human_selected_categories: row.get("human_selected_categories"),
            ai_reasoning: row.get("ai_reasoning"),
            is_suggestion: row.get("is_suggestion"),
            is_verified: row.get("is_verified"),
            study_program_id: row.get("study_program_id"),
        })
    }
}

#[async_trait]
impl ResponseRepository for PgResponseRepository {
    async fn upsert_bulk(&self, rows: Vec<NewSurveyResponse>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let start = Instant::now();
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO survey_response (
                    id, original_row_id, comment_text, sentiment,
                    ai_suggested_categories, human_selected_categories, ai_reasoning,
                    is_suggestion, is_verified, study_program_id, updated_at_utc
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (original_row_id) DO UPDATE SET
                    comment_text = EXCLUDED.comment_text,
                    sentiment = EXCLUDED.sentiment,
                    ai_suggested_categories = EXCLUDED.ai_suggested_categories,
                    human_selected_categories = EXCLUDED.human_selected_categories,
                    ai_reasoning = EXCLUDED.ai_reasoning,
                    is_suggestion = EXCLUDED.is_suggestion,
                    is_verified = EXCLUDED.is_verified,
                    study_program_id = EXCLUDED.study_program_id,
                    updated_at_utc = EXCLUDED.updated_at_utc
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(&row.original_row_id)
            .bind(&row.comment_text)
            .bind(row.sentiment.as_str())
            .bind(&row.ai_suggested_categories)
            .bind(&row.human_selected_categories)
            .bind(&row.ai_reasoning)
            .bind(row.is_suggestion)
            .bind(row.is_verified)
            .bind(row.study_program_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "responses",
            op = "upsert_bulk",
            row_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Upserted survey responses"
        );
        Ok(rows.len())
    }

    async fn list_all(&self) -> Result<Vec<SurveyResponse>> {
        let sql = format!(
            "SELECT {} FROM survey_response r ORDER BY r.original_row_id",
            RESPONSE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<SurveyResponse> {
        let sql = format!(
            "SELECT {} FROM survey_response r WHERE r.id = $1",
            RESPONSE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("survey response {}", id)))?;
        Self::map_row(&row)
    }

    async fn list_page(&self, req: &ResponsePageRequest) -> Result<ResponsePage> {
        let (where_clause, params) = ResponseFilterQueryBuilder::new(req.filter.clone(), 0).build();

        let count_sql = format!(
            "SELECT COUNT(*) AS count FROM survey_response r WHERE {}",
            where_clause
        );
        let count_row = bind_params(sqlx::query(&count_sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        let total: i64 = count_row.get("count");

        let limit_param = params.len() + 1;
        let offset_param = params.len() + 2;
        let page_sql = format!(
            r#"
            SELECT {}, sp.name AS program_name, f.name AS faculty_name
            FROM survey_response r
            JOIN study_program sp ON sp.id = r.study_program_id
            JOIN faculty f ON f.id = sp.faculty_id
            WHERE {}
            ORDER BY r.original_row_id
            LIMIT ${} OFFSET ${}
            "#,
            RESPONSE_COLUMNS, where_clause, limit_param, offset_param
        );
        let rows = bind_params(sqlx::query(&page_sql), &params)
            .bind(req.per_page)
            .bind(req.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(|row| {
                Ok(ResponseListItem {
                    response: Self::map_row(row)?,
                    program_name: row.get("program_name"),
                    faculty_name: row.get("faculty_name"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "responses",
            op = "list_page",
            page = req.page,
            result_count = items.len(),
            total,
            "Listed response page"
        );
        Ok(ResponsePage {
            items,
            total,
            page: req.page.max(1),
            per_page: req.per_page,
        })
    }

    async fn filter_by_categories(&self, names: &[String]) -> Result<Vec<SurveyResponse>> {
        let rows = sqlx::query("SELECT * FROM filter_survey_by_categories($1) r")
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn update_sentiment(&self, id: Uuid, sentiment: Sentiment) -> Result<()> {
        let result = sqlx::query(
            "UPDATE survey_response SET sentiment = $1, updated_at_utc = $2 WHERE id = $3",
        )
        .bind(sentiment.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "survey response", id)
    }

    async fn set_categories(&self, id: Uuid, categories: Vec<String>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE survey_response SET human_selected_categories = $1, updated_at_utc = $2 WHERE id = $3",
        )
        .bind(&categories)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "survey response", id)
    }

    async fn set_suggestion(&self, id: Uuid, is_suggestion: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE survey_response SET is_suggestion = $1, updated_at_utc = $2 WHERE id = $3",
        )
        .bind(is_suggestion)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "survey response", id)
    }
}
