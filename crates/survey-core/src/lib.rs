//! # survey-core
//!
//! Core types, traits, and abstractions for the survey-lens toolkit.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the store adapters, the import pipeline, the analytics engine and the
//! suggestion service depend on.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod snapshot;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::{FilterContext, ResponseFilter};
pub use models::*;
pub use normalize::{normalize_name, trimmed};
pub use snapshot::{ProgramMatch, TaxonomySnapshot};
pub use traits::*;
