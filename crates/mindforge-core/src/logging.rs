//! Structured logging field name constants.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed, or a compensating action failed |
//! | WARN  | Best-effort remote call failed, local state kept |
//! | INFO  | Lifecycle events (startup, shutdown), completed mutations |
//! | DEBUG | Outbound calls, decision points |
//! | TRACE | High-volume data (prompt bodies, rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "storage", "auth"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "anythingllm", "ollama", "pool", "token_cache"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create_workspace", "chat", "generate", "upload"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user id.
pub const USER_ID: &str = "user_id";

/// Notebook id.
pub const NOTEBOOK_ID: &str = "notebook_id";

/// AnythingLLM workspace slug.
pub const SLUG: &str = "slug";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
