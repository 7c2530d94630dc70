//! Core data models for matchday
//!
//! This module contains the league configuration, the normalized fixture
//! types written to the cache, and the aggregate result returned to callers.

pub mod api_football;
pub mod fixtures;
pub mod leagues;

pub use api_football::{ApiFootballClient, FixtureSource};
pub use fixtures::{normalize, normalize_fixture, RawFixture};
pub use leagues::{LeagueConfig, LeagueRegistry, LeagueSummary, DEFAULT_LEAGUE_KEYS};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Inclusive calendar date range of a fixture request
///
/// `from <= to` is assumed, not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// A team as it appears in a normalized fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: u64,
    pub name: String,
    /// Logo URL, empty when the provider has none
    pub logo: String,
}

/// Goals scored so far; both `None` before kickoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

/// League metadata stamped onto every fixture from the registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: u32,
    pub name: String,
    pub country: String,
}

/// A single fixture after normalization
///
/// This is the exact shape stored in cache files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFixture {
    pub fixture_id: u64,
    /// Kickoff as an ISO-8601 string, as supplied by the provider
    pub date: String,
    /// Kickoff in epoch seconds
    pub timestamp: i64,
    /// Short status code (e.g. "NS", "1H", "FT")
    pub status: String,
    pub status_long: String,
    /// Minutes played, when the match is underway or finished
    pub elapsed: Option<u32>,
    pub venue: String,
    pub city: String,
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    pub goals: Goals,
    /// Provider score breakdown (halftime, fulltime, extratime, penalty), passed through untouched
    pub score: serde_json::Value,
    pub league: LeagueInfo,
}

/// Outcome of an aggregate `get_matches` call
///
/// A failed result serializes as `{success, error, timestamp}` only; the
/// per-league fields are meaningless once the request as a whole failed.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub success: bool,
    pub matches_by_league: BTreeMap<String, Vec<NormalizedFixture>>,
    pub total_matches: usize,
    pub date_range: DateRange,
    /// Returned leagues that had a fresh cache entry once processed
    pub cached_leagues: Vec<String>,
    /// Returned leagues that had no fresh cache entry once processed
    pub api_calls_made: u32,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl Serialize for FetchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.success {
            let mut state = serializer.serialize_struct("FetchResult", 3)?;
            state.serialize_field("success", &self.success)?;
            state.serialize_field("error", &self.error)?;
            state.serialize_field("timestamp", &self.timestamp)?;
            return state.end();
        }

        let mut state = serializer.serialize_struct("FetchResult", 7)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("matches_by_league", &self.matches_by_league)?;
        state.serialize_field("total_matches", &self.total_matches)?;
        state.serialize_field("date_range", &self.date_range)?;
        state.serialize_field("cached_leagues", &self.cached_leagues)?;
        state.serialize_field("api_calls_made", &self.api_calls_made)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.end()
    }
}

impl FetchResult {
    /// An empty, successful result to be filled league by league
    pub fn new(date_range: DateRange, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            matches_by_league: BTreeMap::new(),
            total_matches: 0,
            date_range,
            cached_leagues: Vec::new(),
            api_calls_made: 0,
            timestamp,
            error: None,
        }
    }

    /// A failed result carrying only the error message
    pub fn failed(date_range: DateRange, timestamp: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::new(date_range, timestamp)
        }
    }
}
