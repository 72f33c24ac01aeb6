//! Institution / faculty / study program repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use survey_core::{Error, Faculty, Institution, Result, StructureRepository, StudyProgram};

use crate::{expect_affected, validate_name};

/// PostgreSQL implementation of StructureRepository.
pub struct PgStructureRepository {
    pool: Pool<Postgres>,
}

impl PgStructureRepository {
    /// Create a new PgStructureRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StructureRepository for PgStructureRepository {
    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let rows = sqlx::query("SELECT id, name FROM institution ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Institution {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn create_institution(&self, name: &str) -> Result<Institution> {
        let name = validate_name(name, "institution")?;
        let id = Uuid::now_v7();

        sqlx::query("INSERT INTO institution (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(subsystem = "db", component = "structure", op = "create_institution", %id, "Created institution");
        Ok(Institution {
            id,
            name: name.to_string(),
        })
    }

    async fn rename_institution(&self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name, "institution")?;
        let result = sqlx::query("UPDATE institution SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "institution", id)
    }

    async fn delete_institution(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM institution WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "institution", id)
    }

    async fn list_faculties(&self) -> Result<Vec<Faculty>> {
        let rows = sqlx::query("SELECT id, name, institution_id FROM faculty ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Faculty {
                id: r.get("id"),
                name: r.get("name"),
                institution_id: r.get("institution_id"),
            })
            .collect())
    }

    async fn create_faculty(&self, name: &str, institution_id: Uuid) -> Result<Faculty> {
        let name = validate_name(name, "faculty")?;
        let id = Uuid::now_v7();

        sqlx::query("INSERT INTO faculty (id, name, institution_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(institution_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(Faculty {
            id,
            name: name.to_string(),
            institution_id,
        })
    }

    async fn update_faculty(&self, id: Uuid, name: &str, institution_id: Uuid) -> Result<()> {
        let name = validate_name(name, "faculty")?;
        let result = sqlx::query("UPDATE faculty SET name = $1, institution_id = $2 WHERE id = $3")
            .bind(name)
            .bind(institution_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "faculty", id)
    }

    async fn delete_faculty(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "faculty", id)
    }

    async fn list_programs(&self) -> Result<Vec<StudyProgram>> {
        let rows = sqlx::query("SELECT id, name, faculty_id FROM study_program ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| StudyProgram {
                id: r.get("id"),
                name: r.get("name"),
                faculty_id: r.get("faculty_id"),
            })
            .collect())
    }

    async fn create_program(&self, name: &str, faculty_id: Uuid) -> Result<StudyProgram> {
        let name = validate_name(name, "study program")?;
        let id = Uuid::now_v7();

        sqlx::query("INSERT INTO study_program (id, name, faculty_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(faculty_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(StudyProgram {
            id,
            name: name.to_string(),
            faculty_id,
        })
    }

    async fn update_program(&self, id: Uuid, name: &str, faculty_id: Uuid) -> Result<()> {
        let name = validate_name(name, "study program")?;
        let result =
            sqlx::query("UPDATE study_program SET name = $1, faculty_id = $2 WHERE id = $3")
                .bind(name)
                .bind(faculty_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "study program", id)
    }

    async fn delete_program(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM study_program WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        expect_affected(result.rows_affected(), "study program", id)
    }
}
