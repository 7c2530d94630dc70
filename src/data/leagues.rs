//! League registry
//!
//! Maps stable league keys to API-Football league ids, display metadata and
//! the seasons to try, in order, when fetching fixtures.

use serde::Serialize;

/// League keys requested when the caller names none
pub const DEFAULT_LEAGUE_KEYS: [&str; 2] = ["liga_mx", "mls"];

/// Provider and display configuration for one league
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueConfig {
    /// Unique identifier for the league (e.g., "liga_mx")
    pub key: String,
    /// API-Football league id
    pub provider_id: u32,
    /// Human-readable league name
    pub name: String,
    pub country: String,
    /// Seasons tried in listed order until one returns fixtures
    pub seasons: Vec<i32>,
    /// Display ordering hint; not used for lookups
    pub priority: u32,
}

impl LeagueConfig {
    pub fn new(
        key: impl Into<String>,
        provider_id: u32,
        name: impl Into<String>,
        country: impl Into<String>,
        seasons: Vec<i32>,
        priority: u32,
    ) -> Self {
        Self {
            key: key.into(),
            provider_id,
            name: name.into(),
            country: country.into(),
            seasons,
            priority,
        }
    }
}

/// Public description of an available league
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueSummary {
    pub key: String,
    pub name: String,
    pub country: String,
    pub priority: u32,
}

impl From<&LeagueConfig> for LeagueSummary {
    fn from(league: &LeagueConfig) -> Self {
        Self {
            key: league.key.clone(),
            name: league.name.clone(),
            country: league.country.clone(),
            priority: league.priority,
        }
    }
}

/// Immutable set of configured leagues, kept in insertion order
#[derive(Debug, Clone)]
pub struct LeagueRegistry {
    leagues: Vec<LeagueConfig>,
}

impl Default for LeagueRegistry {
    /// The leagues followed by the default deployment
    fn default() -> Self {
        Self::new(vec![
            LeagueConfig::new("liga_mx", 262, "Liga MX", "Mexico", vec![2025, 2024], 1),
            LeagueConfig::new("mls", 253, "Major League Soccer", "USA", vec![2025, 2024], 2),
            LeagueConfig::new(
                "leagues_cup",
                772,
                "Leagues Cup",
                "International",
                vec![2025, 2024, 2023],
                3,
            ),
            LeagueConfig::new(
                "concacaf",
                16,
                "CONCACAF Champions Cup",
                "International",
                vec![2024, 2025],
                4,
            ),
            LeagueConfig::new(
                "champions_league",
                2,
                "UEFA Champions League",
                "Europe",
                vec![2024, 2025],
                5,
            ),
            LeagueConfig::new("premier_league", 39, "Premier League", "England", vec![2024, 2025], 6),
            LeagueConfig::new("la_liga", 140, "La Liga", "Spain", vec![2024, 2025], 7),
        ])
    }
}

impl LeagueRegistry {
    pub fn new(leagues: Vec<LeagueConfig>) -> Self {
        Self { leagues }
    }

    /// Get a league by its key
    ///
    /// # Returns
    ///
    /// Returns `Some(&LeagueConfig)` if found, `None` otherwise
    pub fn resolve(&self, key: &str) -> Option<&LeagueConfig> {
        self.leagues.iter().find(|league| league.key == key)
    }

    /// All configured leagues in registry order
    pub fn list_available(&self) -> Vec<LeagueSummary> {
        self.leagues.iter().map(LeagueSummary::from).collect()
    }

    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}
