//! Structured logging schema and field name constants for survey-lens.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same field names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation aborted, the operator has to act |
//! | WARN  | Recoverable issue, row skipped or default applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-row iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "import", "analytics", "inference", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "reconcile", "commit", "pool", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// External survey row identifier (`No` column).
pub const ROW_ID: &str = "row_id";

/// 1-based line of the row inside the import file.
pub const ROW_NUMBER: &str = "row_number";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows read or processed.
pub const ROW_COUNT: &str = "row_count";

/// Number of entities created during reconciliation.
pub const CREATED_COUNT: &str = "created_count";

/// Number of results returned.
pub const RESULT_COUNT: &str = "result_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
