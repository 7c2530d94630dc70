//! Fixture fetch service
//!
//! `MatchesService` ties the league registry, the disk cache and the
//! rate-limited fetcher together. It is the only entry point callers (the
//! CLI, or any other front end) are expected to use.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::cache::CacheManager;
use crate::clock::{Clock, SystemClock};
use crate::config::{cache_dir_or_default, ServiceConfig};
use crate::data::{
    normalize, ApiFootballClient, DateRange, FetchResult, FixtureSource, LeagueConfig,
    LeagueRegistry, LeagueSummary, NormalizedFixture,
};
use crate::error::{ConfigError, ServiceError};
use crate::fetcher::{RateLimitedFetcher, RateLimiter};

/// Days covered by the default date range, starting today
const DEFAULT_RANGE_DAYS: u64 = 30;

/// Options for an aggregate `get_matches` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Defaults to today
    pub date_from: Option<NaiveDate>,
    /// Defaults to today + 30 days
    pub date_to: Option<NaiveDate>,
    pub use_cache: bool,
    /// Per-league cap on returned fixtures; `Some(0)` means no cap
    pub max_matches: Option<usize>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            use_cache: true,
            max_matches: None,
        }
    }
}

impl MatchOptions {
    /// Resolves the requested range against `today`
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        let from = self.date_from.unwrap_or(today);
        let to = self.date_to.unwrap_or_else(|| {
            today
                .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
                .unwrap_or(today)
        });
        DateRange::new(from, to)
    }
}

/// Fixtures for one league plus how they were obtained
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueFetch {
    pub fixtures: Vec<NormalizedFixture>,
    /// Served from a fresh cache entry
    pub from_cache: bool,
    /// Season that produced the fixtures, for live fetches
    pub season: Option<i32>,
    /// Provider requests issued for this league, successful or not
    pub api_calls: u32,
}

/// Fetches, normalizes and caches fixtures for configured leagues
pub struct MatchesService {
    registry: LeagueRegistry,
    cache: CacheManager,
    /// `None` for an offline service built without an API key
    fetcher: Option<RateLimitedFetcher>,
    clock: Arc<dyn Clock>,
}

impl MatchesService {
    /// Builds the production service: API-Football client, system clock,
    /// default league registry, cache directory created if absent
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = CacheManager::with_dir(config.resolve_cache_dir()?)
            .with_ttl(config.cache_ttl)
            .with_clock(clock.clone());
        cache.ensure_dir()?;

        let source = Arc::new(ApiFootballClient::new(&config)?);
        let limiter = Arc::new(RateLimiter::new(config.min_request_interval, clock.clone()));

        Ok(Self::from_parts(
            LeagueRegistry::default(),
            cache,
            RateLimitedFetcher::new(source, limiter),
            clock,
        ))
    }

    /// Builds a service that never contacts the provider
    ///
    /// Listing leagues, clearing the cache and serving fresh cache entries
    /// work without an API key. A fetch that needs the provider fails with
    /// `ConfigError::MissingApiKey`.
    pub fn offline(cache_dir: Option<PathBuf>) -> Result<Self, ServiceError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = CacheManager::with_dir(cache_dir_or_default(cache_dir)?).with_clock(clock.clone());

        Ok(Self {
            registry: LeagueRegistry::default(),
            cache,
            fetcher: None,
            clock,
        })
    }

    /// Assembles a service from explicit parts
    pub fn from_parts(
        registry: LeagueRegistry,
        cache: CacheManager,
        fetcher: RateLimitedFetcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            cache,
            fetcher: Some(fetcher),
            clock,
        }
    }

    /// Convenience for wiring a custom source with its own limiter
    pub fn with_source(
        registry: LeagueRegistry,
        cache: CacheManager,
        source: Arc<dyn FixtureSource>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_parts(registry, cache, RateLimitedFetcher::new(source, limiter), clock)
    }

    pub fn registry(&self) -> &LeagueRegistry {
        &self.registry
    }

    /// Fixtures for several leagues, tolerating per-league failures
    ///
    /// Unknown keys are skipped with a warning. A league whose fetch fails is
    /// logged and left out. The result only reports `success: false` when the
    /// pipeline fails outside any single league.
    pub async fn get_matches<S: AsRef<str>>(
        &self,
        league_keys: &[S],
        options: &MatchOptions,
    ) -> FetchResult {
        let range = options.date_range(self.clock.now().date_naive());

        match self.collect_matches(league_keys, range, options).await {
            Ok(result) => {
                info!(
                    total = result.total_matches,
                    api_calls = result.api_calls_made,
                    cached = result.cached_leagues.len(),
                    "Fixture request completed"
                );
                result
            }
            Err(e) => {
                error!("Fixture request failed: {e}");
                FetchResult::failed(range, self.clock.now(), e.to_string())
            }
        }
    }

    async fn collect_matches<S: AsRef<str>>(
        &self,
        league_keys: &[S],
        range: DateRange,
        options: &MatchOptions,
    ) -> Result<FetchResult, ServiceError> {
        if options.use_cache {
            self.cache.ensure_dir()?;
        }

        let mut result = FetchResult::new(range, self.clock.now());
        let mut seen = HashSet::new();

        for key in league_keys.iter().map(|key| key.as_ref()) {
            if !seen.insert(key) {
                continue;
            }
            let Some(league) = self.registry.resolve(key) else {
                warn!(league = key, "League not configured, skipping");
                continue;
            };

            let fetch = match self.fetch_league(league, &range, options.use_cache).await {
                Ok(fetch) => fetch,
                Err(e) => {
                    error!(league = key, "Failed to fetch fixtures: {e}");
                    continue;
                }
            };

            debug!(
                league = key,
                from_cache = fetch.from_cache,
                requests = fetch.api_calls,
                "League processed"
            );

            let mut fixtures = fetch.fixtures;
            if fixtures.is_empty() {
                continue;
            }
            if let Some(max) = options.max_matches.filter(|&max| max > 0) {
                fixtures.truncate(max);
            }

            // One count per returned league: cached if a fresh entry exists now
            if self.cache.is_fresh(&CacheManager::fixture_key(key, &range)) {
                result.cached_leagues.push(key.to_string());
            } else {
                result.api_calls_made += 1;
            }

            result.total_matches += fixtures.len();
            result.matches_by_league.insert(key.to_string(), fixtures);
        }

        result.timestamp = self.clock.now();
        Ok(result)
    }

    /// Fixtures for one league and range
    ///
    /// Fails with `ServiceError::UnknownLeague` for an unconfigured key. An
    /// exhausted season list yields an empty list, not an error.
    pub async fn get_league_matches(
        &self,
        league_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        use_cache: bool,
    ) -> Result<Vec<NormalizedFixture>, ServiceError> {
        let league = self
            .registry
            .resolve(league_key)
            .ok_or_else(|| ServiceError::UnknownLeague(league_key.to_string()))?;

        let fetch = self
            .fetch_league(league, &DateRange::new(from, to), use_cache)
            .await?;
        Ok(fetch.fixtures)
    }

    /// Cache first, then the provider season by season
    ///
    /// The first season returning at least one valid fixture wins. Empty or
    /// failing seasons are logged and skipped. A live result is written to the
    /// cache when `use_cache` is set; a failed write is logged, not fatal.
    pub async fn fetch_league(
        &self,
        league: &LeagueConfig,
        range: &DateRange,
        use_cache: bool,
    ) -> Result<LeagueFetch, ServiceError> {
        if use_cache {
            if let Some(fixtures) = self.cache.lookup(&league.key, range)? {
                debug!(league = %league.key, %range, "Using cached fixtures");
                return Ok(LeagueFetch {
                    fixtures,
                    from_cache: true,
                    season: None,
                    api_calls: 0,
                });
            }
        }

        let Some(fetcher) = &self.fetcher else {
            return Err(ConfigError::MissingApiKey.into());
        };

        let mut api_calls = 0;
        for &season in &league.seasons {
            api_calls += 1;
            let raw = match fetcher.fetch_raw(league.provider_id, season, range).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(league = %league.key, season, "Season fetch failed: {e}");
                    continue;
                }
            };

            if raw.is_empty() {
                debug!(league = %league.key, season, "No fixtures for season");
                continue;
            }

            let fixtures = normalize(&raw, league);
            if fixtures.is_empty() {
                warn!(league = %league.key, season, "No valid fixtures in season response");
                continue;
            }

            if use_cache {
                if let Err(e) = self.cache.store(&league.key, range, &fixtures) {
                    warn!(league = %league.key, "Failed to cache fixtures: {e}");
                }
            }

            info!(
                league = %league.key,
                season,
                count = fixtures.len(),
                "Fetched fixtures for {}",
                league.name
            );
            return Ok(LeagueFetch {
                fixtures,
                from_cache: false,
                season: Some(season),
                api_calls,
            });
        }

        info!(league = %league.key, %range, "No fixtures found for {}", league.name);
        Ok(LeagueFetch {
            fixtures: Vec::new(),
            from_cache: false,
            season: None,
            api_calls,
        })
    }

    /// Configured leagues in registry order
    pub fn get_available_leagues(&self) -> Vec<LeagueSummary> {
        self.registry.list_available()
    }

    /// Removes cached entries for one league, or all of them
    pub fn clear_cache(&self, league_key: Option<&str>) -> Result<usize, ServiceError> {
        let removed = self.cache.clear(league_key)?;
        info!(
            league = league_key.unwrap_or("*"),
            removed,
            dir = %self.cache.dir().display(),
            "Cleared cached fixtures"
        );
        Ok(removed)
    }
}
