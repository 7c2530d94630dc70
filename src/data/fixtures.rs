//! Provider fixture records and their normalization
//!
//! API-Football returns deeply nested, partially-null records. Everything is
//! deserialized as optional and then validated per record, so one bad record
//! never sinks the batch.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{Goals, LeagueConfig, LeagueInfo, NormalizedFixture, TeamInfo};
use crate::error::FetchError;

const DEFAULT_STATUS: &str = "NS";
const DEFAULT_STATUS_LONG: &str = "Not Started";
const DEFAULT_VENUE: &str = "TBD";

/// Top-level body of `GET /v3/fixtures`
#[derive(Debug, Deserialize)]
pub struct FixturesResponse {
    #[serde(default)]
    pub response: Option<Vec<RawFixture>>,
}

/// One entry of the provider `response` array
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFixture {
    #[serde(default)]
    pub fixture: Option<RawFixtureInfo>,
    #[serde(default)]
    pub teams: Option<RawTeams>,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default)]
    pub score: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFixtureInfo {
    pub id: Option<u64>,
    pub date: Option<String>,
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub venue: Option<RawVenue>,
    #[serde(default)]
    pub status: Option<RawStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVenue {
    pub name: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatus {
    pub short: Option<String>,
    pub long: Option<String>,
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeams {
    pub home: Option<RawTeam>,
    pub away: Option<RawTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub logo: Option<String>,
}

/// Normalizes a batch of provider records for `league`
///
/// Records missing a required field are logged and skipped. The output is
/// sorted by kickoff; records with equal kickoff keep their input order.
pub fn normalize(raw: &[RawFixture], league: &LeagueConfig) -> Vec<NormalizedFixture> {
    let mut fixtures: Vec<NormalizedFixture> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match normalize_fixture(record, league) {
            Ok(fixture) => Some(fixture),
            Err(e) => {
                warn!(league = %league.key, index, "Skipping fixture record: {e}");
                None
            }
        })
        .collect();

    fixtures.sort_by_key(kickoff_key);
    fixtures
}

/// Normalizes a single provider record
///
/// Fails with `FetchError::Validation` when the fixture id, either team's id
/// or name, or both of the kickoff date and timestamp are absent.
pub fn normalize_fixture(
    raw: &RawFixture,
    league: &LeagueConfig,
) -> Result<NormalizedFixture, FetchError> {
    let info = raw
        .fixture
        .as_ref()
        .ok_or_else(|| missing("fixture"))?;
    let fixture_id = info.id.ok_or_else(|| missing("fixture.id"))?;
    let (date, timestamp) = kickoff(info)?;

    let teams = raw.teams.as_ref().ok_or_else(|| missing("teams"))?;
    let home_team = team(teams.home.as_ref(), "home")?;
    let away_team = team(teams.away.as_ref(), "away")?;

    let status = info.status.clone().unwrap_or_default();
    let venue = info.venue.clone().unwrap_or_default();

    Ok(NormalizedFixture {
        fixture_id,
        date,
        timestamp,
        status: status.short.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        status_long: status.long.unwrap_or_else(|| DEFAULT_STATUS_LONG.to_string()),
        elapsed: status.elapsed,
        venue: venue.name.unwrap_or_else(|| DEFAULT_VENUE.to_string()),
        city: venue.city.unwrap_or_default(),
        home_team,
        away_team,
        goals: raw.goals.unwrap_or_default(),
        score: raw
            .score
            .clone()
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| Value::Object(Default::default())),
        league: LeagueInfo {
            id: league.provider_id,
            name: league.name.clone(),
            country: league.country.clone(),
        },
    })
}

/// Resolves kickoff date and timestamp, deriving whichever one is missing
fn kickoff(info: &RawFixtureInfo) -> Result<(String, i64), FetchError> {
    match (&info.date, info.timestamp) {
        (Some(date), Some(ts)) => Ok((date.clone(), ts)),
        (Some(date), None) => {
            let ts = DateTime::parse_from_rfc3339(date)
                .map_err(|_| FetchError::Validation(format!("fixture.timestamp (unparseable date '{date}')")))?
                .timestamp();
            Ok((date.clone(), ts))
        }
        (None, Some(ts)) => {
            let date = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| missing("fixture.date"))?
                .to_rfc3339();
            Ok((date, ts))
        }
        (None, None) => Err(missing("fixture.date")),
    }
}

fn team(raw: Option<&RawTeam>, side: &str) -> Result<TeamInfo, FetchError> {
    let raw = raw.ok_or_else(|| missing(&format!("teams.{side}")))?;
    Ok(TeamInfo {
        id: raw.id.ok_or_else(|| missing(&format!("teams.{side}.id")))?,
        name: raw
            .name
            .clone()
            .ok_or_else(|| missing(&format!("teams.{side}.name")))?,
        logo: raw.logo.clone().unwrap_or_default(),
    })
}

fn missing(field: &str) -> FetchError {
    FetchError::Validation(field.to_string())
}

/// Sort key: the provider date parsed as RFC 3339, else the provider timestamp
fn kickoff_key(fixture: &NormalizedFixture) -> i64 {
    DateTime::parse_from_rfc3339(&fixture.date)
        .map(|d| d.timestamp())
        .unwrap_or(fixture.timestamp)
}
