//! # survey-inference
//!
//! Category suggestions for survey comments.
//!
//! This crate provides:
//! - OpenAI-compatible chat backend (feature `openai`, on by default)
//! - Suggestion prompt, reply cleanup and schema validation
//! - Review queue: accept a suggestion into the taxonomy or reject it
//!
//! # Example
//!
//! ```rust,no_run
//! use survey_inference::{suggestion, OpenAIBackend};
//!
//! # async fn run(db: &survey_db::Database) -> survey_core::Result<()> {
//! let backend = OpenAIBackend::from_env()?;
//! let comments = ["Wifi di perpustakaan sering mati"];
//! let queued = suggestion::suggest_and_enqueue(&backend, db.suggestions.as_ref(), &comments).await?;
//! println!("{} suggestions waiting for review", queued.len());
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod suggestion;

#[cfg(feature = "openai")]
pub mod openai;

// Scripted backend for unit tests
#[cfg(test)]
pub mod mock;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

pub use queue::{accept, reject, AcceptOutcome};
pub use suggestion::{
    build_prompt, parse_suggestions, strip_code_fence, suggest_and_enqueue, suggest_categories,
    SYSTEM_PROMPT,
};
