// Chunked-transfer defaults; all overridable through the environment (see config.rs)
pub const DEFAULT_CHUNK_SIZE: u64 = 4 * 1024 * 1024;
pub const DEFAULT_CHUNK_THRESHOLD: u64 = 8 * 1024 * 1024;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_CONCURRENT_CHUNKS: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;

// Exponential backoff between chunk retry attempts
pub const RETRY_BACKOFF_BASE_MS: u64 = 250;
pub const RETRY_BACKOFF_CAP_MS: u64 = 5_000;
