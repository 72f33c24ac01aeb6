//! Parent / sub-category repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use survey_core::{CategoryRepository, Error, ParentCategory, Result, SubCategory};

use crate::{expect_affected, validate_name};

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list_parents(&self) -> Result<Vec<ParentCategory>> {
        let rows =
            sqlx::query("SELECT id, name, description FROM parent_category ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ParentCategory {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
            })
            .collect())
    }

    async fn create_parent(&self, name: &str, description: Option<&str>) -> Result<ParentCategory> {
        let name = validate_name(name, "parent category")?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let id = Uuid::now_v7();

        sqlx::query("INSERT INTO parent_category (id, name, description) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(ParentCategory {
            id,
            name: name.to_string(),
            description: description.map(String::from),
        })
    }

    async fn rename_parent(&self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name, "parent category")?;
        let result = sqlx::query("UPDATE parent_category SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "parent category", id)
    }

    async fn delete_parent(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM parent_category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "parent category", id)
    }

    async fn list_subcategories(&self) -> Result<Vec<SubCategory>> {
        let rows = sqlx::query(
            "SELECT id, name, parent_category_id FROM sub_category ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| SubCategory {
                id: r.get("id"),
                name: r.get("name"),
                parent_category_id: r.get("parent_category_id"),
            })
            .collect())
    }

    async fn create_subcategory(&self, name: &str, parent_id: Uuid) -> Result<SubCategory> {
        let name = validate_name(name, "sub-category")?;
        let id = Uuid::now_v7();

        sqlx::query("INSERT INTO sub_category (id, name, parent_category_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(parent_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(SubCategory {
            id,
            name: name.to_string(),
            parent_category_id: parent_id,
        })
    }

    async fn update_subcategory(&self, id: Uuid, name: &str, parent_id: Uuid) -> Result<()> {
        let name = validate_name(name, "sub-category")?;
        let result =
            sqlx::query("UPDATE sub_category SET name = $1, parent_category_id = $2 WHERE id = $3")
                .bind(name)
                .bind(parent_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "sub-category", id)
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM sub_category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "sub-category", id)
    }
}
