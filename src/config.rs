use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transfer::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD, DEFAULT_MAX_CONCURRENT_CHUNKS,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_TIMEOUT_SECS,
};

/// Client configuration, passed explicitly to whichever component issues
/// requests. No global mutable state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote storage service, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    /// Size of each uploaded chunk in bytes.
    pub chunk_size: u64,
    /// Files at or below this size take the whole-file upload path.
    pub chunk_threshold: u64,
    /// Retry budget per chunk for transient failures.
    pub max_retries: u32,
    /// Maximum number of simultaneously in-flight chunk uploads.
    pub max_concurrent_chunks: usize,
    /// Per-request timeout for chunk and completion calls.
    pub request_timeout: Duration,
    /// Overall budget for one chunked-upload session.
    pub session_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            max_concurrent_chunks: DEFAULT_MAX_CONCURRENT_CHUNKS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig {
                message: "base URL must not be empty".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig {
                message: "chunk size must be greater than zero".to_string(),
            });
        }
        if self.max_concurrent_chunks == 0 {
            return Err(Error::InvalidConfig {
                message: "max concurrent chunks must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Load client configuration from environment variables.
///
/// `DEPOT_ENDPOINT` is required; everything else falls back to the defaults
/// in `transfer::constants`.
pub fn load_client_config() -> Result<ClientConfig> {
    let base_url = env::var("DEPOT_ENDPOINT").map_err(|_| Error::MissingEnvVar {
        key: "DEPOT_ENDPOINT".to_string(),
    })?;

    let mut config = ClientConfig::new(base_url);
    if let Some(v) = parse_env("DEPOT_CHUNK_SIZE")? {
        config.chunk_size = v;
    }
    if let Some(v) = parse_env("DEPOT_CHUNK_THRESHOLD")? {
        config.chunk_threshold = v;
    }
    if let Some(v) = parse_env("DEPOT_MAX_RETRIES")? {
        config.max_retries = v;
    }
    if let Some(v) = parse_env("DEPOT_MAX_CONCURRENT_CHUNKS")? {
        config.max_concurrent_chunks = v;
    }
    if let Some(v) = parse_env("DEPOT_REQUEST_TIMEOUT_SECS")? {
        config.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = parse_env("DEPOT_SESSION_TIMEOUT_SECS")? {
        config.session_timeout = Duration::from_secs(v);
    }

    config.validate()?;
    Ok(config)
}

// Absent variables are fine; present-but-unparsable ones are configuration errors.
fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| Error::InvalidConfig {
            message: format!("{key}='{raw}' is not a valid value"),
        }),
        Err(_) => Ok(None),
    }
}
