//! # survey-db
//!
//! PostgreSQL store adapter for survey-lens.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for both taxonomies, survey responses and
//!   the suggestion queue
//! - Server-side translation of response filters into SQL
//! - An in-memory adapter implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use survey_db::{Database, StructureRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/survey").await?;
//!     let institution = db.structure.create_institution("Universitas X").await?;
//!     println!("Created institution: {}", institution.id);
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod memory;
pub mod pool;
pub mod response_filter;
pub mod responses;
pub mod structure;
pub mod suggestions;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use survey_core::*;

pub use categories::PgCategoryRepository;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use response_filter::{QueryParam, ResponseFilterQueryBuilder};
pub use responses::PgResponseRepository;
pub use structure::PgStructureRepository;
pub use suggestions::PgSuggestionRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Trim a name and reject it when empty.
pub(crate) fn validate_name<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} name must not be empty", what)));
    }
    Ok(trimmed)
}

/// Map a zero-row update/delete to `NotFound`.
pub(crate) fn expect_affected(rows: u64, what: &str, id: uuid::Uuid) -> Result<()> {
    if rows == 0 {
        return Err(Error::NotFound(format!("{} {}", what, id)));
    }
    Ok(())
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub structure: std::sync::Arc<PgStructureRepository>,
    pub categories: std::sync::Arc<PgCategoryRepository>,
    pub responses: std::sync::Arc<PgResponseRepository>,
    pub suggestions: std::sync::Arc<PgSuggestionRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            structure: std::sync::Arc::new(PgStructureRepository::new(pool.clone())),
            categories: std::sync::Arc::new(PgCategoryRepository::new(pool.clone())),
            responses: std::sync::Arc::new(PgResponseRepository::new(pool.clone())),
            suggestions: std::sync::Arc::new(PgSuggestionRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
