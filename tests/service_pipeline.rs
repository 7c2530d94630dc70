//! End-to-end tests of the fetch-cache-normalize pipeline
//!
//! Drives `MatchesService` through its public API with a scripted fixture
//! source and a manual clock, so no network access or real sleeping happens.

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

use matchday::cache::CacheManager;
use matchday::clock::ManualClock;
use matchday::data::api_football::decode_fixtures;
use matchday::data::{DateRange, FixtureSource, LeagueConfig, LeagueRegistry, RawFixture};
use matchday::fetcher::RateLimiter;
use matchday::{FetchError, MatchOptions, MatchesService};

/// Provider stand-in returning canned JSON bodies per (league id, season)
#[derive(Default)]
struct ScriptedProvider {
    bodies: HashMap<(u32, i32), String>,
    calls: Mutex<Vec<(u32, i32, DateRange)>>,
}

impl ScriptedProvider {
    fn body(mut self, provider_id: u32, season: i32, fixtures: Vec<Value>) -> Self {
        let body = json!({ "get": "fixtures", "errors": [], "response": fixtures });
        self.bodies.insert((provider_id, season), body.to_string());
        self
    }

    fn raw_body(mut self, provider_id: u32, season: i32, body: &str) -> Self {
        self.bodies.insert((provider_id, season), body.to_string());
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FixtureSource for ScriptedProvider {
    async fn fetch_raw(
        &self,
        provider_id: u32,
        season: i32,
        range: &DateRange,
    ) -> Result<Vec<RawFixture>, FetchError> {
        self.calls.lock().unwrap().push((provider_id, season, *range));
        match self.bodies.get(&(provider_id, season)) {
            Some(body) => decode_fixtures(body),
            None => Ok(Vec::new()),
        }
    }
}

fn fixture(id: u64, date: &str) -> Value {
    json!({
        "fixture": {
            "id": id,
            "date": date,
            "venue": { "id": null, "name": null, "city": null },
            "status": { "short": "NS", "long": "Not Started", "elapsed": null }
        },
        "teams": {
            "home": { "id": 100 + id, "name": format!("Home {id}"), "logo": null },
            "away": { "id": 200 + id, "name": format!("Away {id}"), "logo": null }
        },
        "goals": { "home": null, "away": null },
        "score": { "fulltime": { "home": null, "away": null } }
    })
}

fn registry() -> LeagueRegistry {
    LeagueRegistry::new(vec![
        LeagueConfig::new("liga_mx", 262, "Liga MX", "Mexico", vec![2025, 2024], 1),
        LeagueConfig::new("mls", 253, "Major League Soccer", "USA", vec![2025, 2024], 2),
    ])
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

struct Setup {
    service: MatchesService,
    provider: Arc<ScriptedProvider>,
    clock: Arc<ManualClock>,
    dir: TempDir,
}

fn setup(provider: ScriptedProvider) -> Setup {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::starting_now());
    let cache = CacheManager::with_dir(dir.path().join("matches")).with_clock(clock.clone());
    let provider = Arc::new(provider);
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1), clock.clone()));
    let service = MatchesService::with_source(registry(), cache, provider.clone(), limiter, clock.clone());
    Setup {
        service,
        provider,
        clock,
        dir,
    }
}

#[tokio::test]
async fn test_cached_call_returns_identical_bytes() {
    let s = setup(ScriptedProvider::default().body(
        262,
        2025,
        vec![
            fixture(2, "2025-01-18T21:00:00-06:00"),
            fixture(1, "2025-01-11T19:00:00-06:00"),
        ],
    ));

    let first = s
        .service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), true)
        .await
        .unwrap();
    let second = s
        .service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), true)
        .await
        .unwrap();

    assert_eq!(s.provider.call_count(), 1);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );

    let on_disk = fs::read_to_string(
        s.dir
            .path()
            .join("matches")
            .join("liga_mx_2025-01-01_2025-01-31.json"),
    )
    .unwrap();
    assert_eq!(on_disk, serde_json::to_string(&first).unwrap());
}

#[tokio::test]
async fn test_expired_entry_is_deleted_then_refetched() {
    let s = setup(ScriptedProvider::default().body(262, 2025, vec![fixture(1, "2025-01-11T19:00:00-06:00")]));
    let path = s
        .dir
        .path()
        .join("matches")
        .join("liga_mx_2025-01-01_2025-01-31.json");

    s.service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), true)
        .await
        .unwrap();
    assert!(path.exists());

    s.clock.advance(Duration::from_secs(1801 + 60));

    // A stale entry is removed by the read that finds it
    let cache = CacheManager::with_dir(s.dir.path().join("matches")).with_clock(s.clock.clone());
    let range = DateRange::new(date("2025-01-01"), date("2025-01-31"));
    assert_eq!(cache.lookup("liga_mx", &range).unwrap(), None);
    assert!(!path.exists());

    s.service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), true)
        .await
        .unwrap();
    assert_eq!(s.provider.call_count(), 2);
    assert!(path.exists(), "Live fetch writes the entry back");
}

#[tokio::test]
async fn test_season_fallback_uses_second_season() {
    let s = setup(
        ScriptedProvider::default()
            .body(262, 2025, vec![])
            .body(262, 2024, vec![fixture(9, "2024-11-30T19:00:00-06:00")]),
    );

    let fixtures = s
        .service
        .get_league_matches("liga_mx", date("2024-11-01"), date("2024-12-31"), false)
        .await
        .unwrap();

    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0].fixture_id, 9);
    let seasons: Vec<i32> = s
        .provider
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(_, season, _)| *season)
        .collect();
    assert_eq!(seasons, vec![2025, 2024]);
}

#[tokio::test]
async fn test_malformed_season_body_falls_through() {
    let s = setup(
        ScriptedProvider::default()
            .raw_body(262, 2025, "<html>502 Bad Gateway</html>")
            .body(262, 2024, vec![fixture(3, "2025-01-11T19:00:00-06:00")]),
    );

    let fixtures = s
        .service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), true)
        .await
        .unwrap();

    assert_eq!(fixtures.len(), 1);
}

#[tokio::test]
async fn test_aggregate_ignores_unknown_league() {
    let s = setup(ScriptedProvider::default().body(262, 2025, vec![fixture(1, "2025-01-11T19:00:00-06:00")]));
    let options = MatchOptions {
        date_from: Some(date("2025-01-01")),
        date_to: Some(date("2025-01-31")),
        ..Default::default()
    };

    let result = s.service.get_matches(&["liga_mx", "unknown_key"], &options).await;

    assert!(result.success);
    assert_eq!(
        result.matches_by_league.keys().collect::<Vec<_>>(),
        vec!["liga_mx"]
    );
    assert_eq!(result.total_matches, 1);
    // Written through on the live fetch, so it counts as cached
    assert_eq!(result.cached_leagues, vec!["liga_mx"]);
    assert_eq!(result.api_calls_made, 0);
}

#[tokio::test]
async fn test_max_matches_keeps_earliest() {
    let s = setup(ScriptedProvider::default().body(
        253,
        2025,
        vec![
            fixture(3, "2025-03-15T19:30:00-04:00"),
            fixture(5, "2025-03-29T19:30:00-04:00"),
            fixture(1, "2025-03-01T19:30:00-05:00"),
            fixture(4, "2025-03-22T19:30:00-04:00"),
            fixture(2, "2025-03-08T19:30:00-05:00"),
        ],
    ));
    let options = MatchOptions {
        date_from: Some(date("2025-03-01")),
        date_to: Some(date("2025-03-31")),
        max_matches: Some(2),
        ..Default::default()
    };

    let result = s.service.get_matches(&["mls"], &options).await;

    let ids: Vec<u64> = result.matches_by_league["mls"]
        .iter()
        .map(|f| f.fixture_id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(result.total_matches, 2);
}

#[tokio::test]
async fn test_null_venue_gets_placeholder() {
    let s = setup(ScriptedProvider::default().body(262, 2025, vec![fixture(1, "2025-01-11T19:00:00-06:00")]));

    let fixtures = s
        .service
        .get_league_matches("liga_mx", date("2025-01-01"), date("2025-01-31"), false)
        .await
        .unwrap();

    assert_eq!(fixtures[0].venue, "TBD");
    assert_eq!(fixtures[0].city, "");
    assert_eq!(fixtures[0].home_team.logo, "");
    assert_eq!(fixtures[0].league.name, "Liga MX");
    assert_eq!(fixtures[0].timestamp, 1_736_643_600);
}

#[tokio::test]
async fn test_distinct_ranges_use_distinct_entries() {
    let s = setup(ScriptedProvider::default().body(262, 2025, vec![fixture(1, "2025-01-11T19:00:00-06:00")]));

    for (from, to) in [
        ("2025-01-01", "2025-01-31"),
        ("2025-01-01", "2025-01-31"),
        ("2025-01-01", "2025-02-28"),
    ] {
        s.service
            .get_league_matches("liga_mx", date(from), date(to), true)
            .await
            .unwrap();
    }

    assert_eq!(s.provider.call_count(), 2);
    let mut files: Vec<String> = fs::read_dir(s.dir.path().join("matches"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            "liga_mx_2025-01-01_2025-01-31.json",
            "liga_mx_2025-01-01_2025-02-28.json"
        ]
    );
}

#[tokio::test]
async fn test_live_fetches_are_spaced_one_second_apart() {
    let s = setup(
        ScriptedProvider::default()
            .body(262, 2024, vec![fixture(1, "2025-01-11T19:00:00-06:00")])
            .body(253, 2025, vec![fixture(2, "2025-01-12T19:00:00-06:00")]),
    );
    let options = MatchOptions {
        date_from: Some(date("2025-01-01")),
        date_to: Some(date("2025-01-31")),
        use_cache: false,
        ..Default::default()
    };

    let result = s.service.get_matches(&["liga_mx", "mls"], &options).await;

    // Three requests (liga_mx falls back to 2024), two uncached leagues
    assert_eq!(s.provider.call_count(), 3);
    assert_eq!(result.api_calls_made, 2);
    assert_eq!(s.clock.sleeps(), vec![Duration::from_secs(1); 2]);
}
