//! API-Football client (RapidAPI)
//!
//! This module issues `GET /v3/fixtures` requests and decodes the raw fixture
//! records. Rate limiting and season fallback live above it, in the fetcher
//! and the service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::fixtures::{FixturesResponse, RawFixture};
use super::DateRange;
use crate::config::ServiceConfig;
use crate::error::{ConfigError, FetchError};

/// Anything that can produce raw fixture records for a league season
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Fetch the raw fixtures of one league season within `range`
    async fn fetch_raw(
        &self,
        provider_id: u32,
        season: i32,
        range: &DateRange,
    ) -> Result<Vec<RawFixture>, FetchError>;
}

/// Client for fetching fixtures from API-Football through RapidAPI
#[derive(Debug, Clone)]
pub struct ApiFootballClient {
    client: Client,
    api_key: String,
    api_host: String,
    base_url: String,
    timezone: String,
}

impl ApiFootballClient {
    /// Create a client from the service configuration
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
            base_url: config.base_url.clone(),
            timezone: config.timezone.clone(),
        }
    }

    /// Query parameters for one fixtures request
    fn query(&self, provider_id: u32, season: i32, range: &DateRange) -> Vec<(&'static str, String)> {
        vec![
            ("league", provider_id.to_string()),
            ("season", season.to_string()),
            ("from", range.from.to_string()),
            ("to", range.to.to_string()),
            ("timezone", self.timezone.clone()),
        ]
    }
}

#[async_trait]
impl FixtureSource for ApiFootballClient {
    async fn fetch_raw(
        &self,
        provider_id: u32,
        season: i32,
        range: &DateRange,
    ) -> Result<Vec<RawFixture>, FetchError> {
        debug!(provider_id, season, %range, "Requesting fixtures");

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(provider_id, season, range))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Api {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        decode_fixtures(&text)
    }
}

/// Decode a fixtures response body; a missing `response` array is empty
pub fn decode_fixtures(body: &str) -> Result<Vec<RawFixture>, FetchError> {
    let parsed: FixturesResponse = serde_json::from_str(body)?;
    Ok(parsed.response.unwrap_or_default())
}
