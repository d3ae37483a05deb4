//! Centralized default constants for the MindForge backend.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page number for paged admin listings.
pub const PAGE: i64 = 1;

/// Default page size when the client omits or garbles `pageSize`.
pub const PAGE_SIZE: i64 = 10;

/// Upper bound for `pageSize`.
pub const PAGE_SIZE_MAX: i64 = 100;

// =============================================================================
// AUTH
// =============================================================================

/// bcrypt cost factor, compatible with hashes already stored in `users`.
pub const BCRYPT_COST: u32 = 10;

/// JWT lifetime in seconds.
pub const JWT_EXPIRES_IN_SECS: i64 = 3600;

/// Redis TTL of the cached per-user token, in seconds.
pub const TOKEN_CACHE_TTL_SECS: u64 = 3600;

/// Redis key prefix for cached tokens (`token:{user_id}`).
pub const TOKEN_CACHE_PREFIX: &str = "token:";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3001;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (100 MB, for base64 uploads).
pub const MAX_BODY_SIZE_BYTES: usize = 100 * 1024 * 1024;

/// Default database pool size.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// How often the server logs pool health, in seconds.
pub const POOL_METRICS_INTERVAL_SECS: u64 = 300;

// =============================================================================
// ANYTHINGLLM
// =============================================================================

/// Default AnythingLLM base URL.
pub const ANYTHINGLLM_URL: &str = "http://127.0.0.1:53065";

/// Timeout for AnythingLLM requests in seconds (chat can be slow).
pub const ANYTHINGLLM_TIMEOUT_SECS: u64 = 120;

/// Default chat mode sent to workspace chat.
pub const CHAT_MODE: &str = "chat";

// =============================================================================
// OLLAMA (legacy chat)
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model for the legacy chat path.
pub const GEN_MODEL: &str = "llama3.2:latest";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Sampling temperature for legacy chat.
pub const GEN_TEMPERATURE: f32 = 0.7;

/// Nucleus sampling for legacy chat.
pub const GEN_TOP_P: f32 = 0.9;

/// Maximum tokens generated per reply.
pub const GEN_NUM_PREDICT: i32 = 2000;

/// Context window requested from Ollama.
pub const GEN_NUM_CTX: i32 = 4096;

/// Repeat penalty for legacy chat.
pub const GEN_REPEAT_PENALTY: f32 = 1.1;

/// Messages kept per legacy conversation (10 exchanges).
pub const CONVERSATION_MAX_MESSAGES: usize = 20;

/// Idle time after which a legacy conversation is evicted, in seconds.
pub const CONVERSATION_IDLE_SECS: u64 = 3600;

// =============================================================================
// CONTENT
// =============================================================================

/// Folder used when the client does not name a notebook.
pub const DEFAULT_FOLDER: &str = "default";

/// Cover image used for forum posts created without one.
pub const DEFAULT_POST_IMAGE_URL: &str =
    "https://mind-forge-server.oss-cn-beijing.aliyuncs.com/show/%E7%82%B9%E5%87%BB%E6%9F%A5%E7%9C%8B.png";

/// Blob key prefix for uploaded sources.
pub const SOURCES_PREFIX: &str = "sources";

/// Blob key prefix for avatars.
pub const AVATARS_PREFIX: &str = "avatars";

/// Blob key prefix for feedback screenshots.
pub const FEEDBACK_SCREENSHOTS_PREFIX: &str = "feedback/screenshots";

/// Blob key prefix for generic data-URL uploads.
pub const UPLOADS_PREFIX: &str = "uploads";

// =============================================================================
// STATS
// =============================================================================

/// Days covered by the daily trend series (today included).
pub const STATS_TREND_DAYS: i64 = 7;

/// Number of users in the "top users by notes" ranking.
pub const STATS_TOP_USERS: i64 = 10;
