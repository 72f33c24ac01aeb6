//! # survey-analytics
//!
//! Filtering and aggregation behind the survey dashboard.
//!
//! This crate provides:
//! - [`engine::compute`]: filter responses and derive every chart series
//! - [`keywords`]: keyword frequency over comment text
//! - [`selection::FilterSelection`]: name-based filter selections resolved against the taxonomy
//! - [`state::DashboardState`]: loaded reference data, responses and the active filter
//!
//! ## Example
//!
//! ```ignore
//! use survey_analytics::{DashboardState, FilterSelection};
//!
//! let mut state = DashboardState::load(&db.structure, &db.categories, &db.responses).await?;
//! state.select(&FilterSelection {
//!     parent: Some("Infrastructure".to_string()),
//!     ..Default::default()
//! })?;
//! let data = state.recompute();
//! println!("net score {}", data.net_sentiment_score);
//! ```

pub mod engine;
pub mod keywords;
pub mod selection;
pub mod state;

pub use engine::{
    compute, filter_responses, net_sentiment_score, DashboardData, ParentSentiment,
    SentimentBreakdown, SentimentCount, SubcategorySeries, SubcategorySentiment,
};
pub use keywords::{top_keywords, KeywordCount};
pub use selection::FilterSelection;
pub use state::DashboardState;
