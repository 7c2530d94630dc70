//! Service configuration
//!
//! The API key has no built-in fallback: it must come from the caller, the
//! `--api-key` flag, or the `RAPIDAPI_KEY` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::error::ConfigError;

/// Environment variable holding the RapidAPI key
pub const API_KEY_ENV: &str = "RAPIDAPI_KEY";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "MATCHDAY_CACHE_DIR";

pub const DEFAULT_API_HOST: &str = "api-football-v1.p.rapidapi.com";
pub const DEFAULT_BASE_URL: &str = "https://api-football-v1.p.rapidapi.com/v3/fixtures";
pub const DEFAULT_TIMEZONE: &str = "America/Mexico_City";

/// Age after which a cache entry is stale (30 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(1800);

/// Minimum spacing between consecutive provider requests
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Per-call transport timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything `MatchesService::new` needs to talk to the provider and the cache
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    pub timezone: String,
    /// `None` resolves to the XDG cache directory when the service is built
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub min_request_interval: Duration,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Configuration with the given API key and defaults for everything else
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Builds a configuration from an optional key and cache directory
    ///
    /// A missing or blank key is a hard error.
    pub fn from_parts(
        api_key: Option<String>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        config.cache_dir = cache_dir;
        Ok(config)
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// The configured cache directory, or the platform default
    pub fn resolve_cache_dir(&self) -> Result<PathBuf, ConfigError> {
        cache_dir_or_default(self.cache_dir.clone())
    }
}

/// `cache_dir` when given, otherwise the platform default
pub fn cache_dir_or_default(cache_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    cache_dir.or_else(default_cache_dir).ok_or(ConfigError::NoCacheDir)
}

/// XDG-compliant cache location (`~/.cache/matchday/matches` on Linux)
///
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "matchday")?;
    Some(project_dirs.cache_dir().join("matches"))
}
