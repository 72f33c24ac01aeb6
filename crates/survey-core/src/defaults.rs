//! Centralized default constants for survey-lens.
//!
//! All crates and the `survey` binary reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size for the review listing.
pub const PAGE_LIMIT: i64 = 50;

// =============================================================================
// ANALYTICS
// =============================================================================

/// Number of keywords kept in the keyword frequency series.
pub const KEYWORD_LIMIT: usize = 20;

/// Tokens of this many characters or fewer are not counted as keywords.
pub const KEYWORD_MAX_IGNORED_LEN: usize = 2;

/// Default number of sub-categories shown in the sub-category chart.
pub const SUBCATEGORY_TOP_N: usize = 10;

/// Words ignored by the keyword counter (Indonesian function words).
pub const STOP_WORDS: &[&str] = &[
    "dan", "di", "ke", "dari", "saya", "ini", "itu", "yang", "untuk", "dengan", "tidak", "ada",
    "sudah", "bisa", "karena", "yg", "juga", "lebih", "tapi", "sangat", "lagi", "tdk",
];

// =============================================================================
// IMPORT
// =============================================================================

/// Maximum number of comments sent to the suggestion service at once.
pub const SUGGESTION_COMMENT_LIMIT: usize = 50;

/// Lines inspected when sniffing the delimiter of an import file.
pub const DELIMITER_SNIFF_LINES: usize = 5;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for category suggestions.
pub const GEN_TEMPERATURE: f32 = 0.3;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;
