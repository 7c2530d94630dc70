//! Error types for the fixture fetch pipeline
//!
//! Each concern has its own error enum; `ServiceError` composes them for the
//! operations exposed by `MatchesService`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the service configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key was supplied via flag, constructor, or environment
    #[error("API key is required: pass --api-key or set RAPIDAPI_KEY")]
    MissingApiKey,

    /// The platform cache directory could not be determined
    #[error("Could not determine a cache directory; set MATCHDAY_CACHE_DIR")]
    NoCacheDir,

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from a single provider request or from normalizing one record
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-200 status
    #[error("API error: HTTP {status}")]
    Api { status: u16 },

    /// Response body was not the expected JSON
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A provider record lacks a field the normalized fixture requires
    #[error("Fixture record is missing required field: {0}")]
    Validation(String),
}

/// Errors touching the on-disk cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by `MatchesService` operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The league key is not present in the registry
    #[error("League '{0}' is not configured")]
    UnknownLeague(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
