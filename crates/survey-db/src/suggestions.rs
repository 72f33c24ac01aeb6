//! Category suggestion review queue.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use survey_core::{
    CategorySuggestion, Error, PendingSuggestion, Result, SuggestionRepository, SuggestionStatus,
};

use crate::expect_affected;

/// PostgreSQL implementation of SuggestionRepository.
pub struct PgSuggestionRepository {
    pool: Pool<Postgres>,
}

impl PgSuggestionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<PendingSuggestion> {
        let status: String = row.get("status");
        Ok(PendingSuggestion {
            id: row.get("id"),
            parent_name: row.get("parent_name"),
            child_name: row.get("child_name"),
            status: status.parse().map_err(Error::Internal)?,
            created_at_utc: row.get("created_at_utc"),
        })
    }
}

#[async_trait]
impl SuggestionRepository for PgSuggestionRepository {
    async fn enqueue(&self, suggestions: &[CategorySuggestion]) -> Result<Vec<PendingSuggestion>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut queued = Vec::with_capacity(suggestions.len());

        for s in suggestions {
            let pending = PendingSuggestion {
                id: Uuid::now_v7(),
                parent_name: s.parent.clone(),
                child_name: s.child.clone(),
                status: SuggestionStatus::Pending,
                created_at_utc: Utc::now(),
            };
            sqlx::query(
                "INSERT INTO category_suggestion (id, parent_name, child_name, status, created_at_utc)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(pending.id)
            .bind(&pending.parent_name)
            .bind(&pending.child_name)
            .bind(pending.status.to_string())
            .bind(pending.created_at_utc)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            queued.push(pending);
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(queued)
    }

    async fn list_suggestions(&self, status: Option<SuggestionStatus>) -> Result<Vec<PendingSuggestion>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_name, child_name, status, created_at_utc
            FROM category_suggestion
            WHERE $1::text IS NULL OR status = $1
            ORDER BY created_at_utc DESC, id DESC
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get_suggestion(&self, id: Uuid) -> Result<PendingSuggestion> {
        let row = sqlx::query(
            "SELECT id, parent_name, child_name, status, created_at_utc
             FROM category_suggestion WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("suggestion {}", id)))?;
        Self::map_row(&row)
    }

    async fn set_suggestion_status(&self, id: Uuid, status: SuggestionStatus) -> Result<()> {
        let result = sqlx::query("UPDATE category_suggestion SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "suggestion", id)
    }
}
