//! Cache manager for persisting normalized fixtures to disk
//!
//! Provides a `CacheManager` that stores serializable data as JSON files and
//! judges freshness from each file's modification time.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DEFAULT_CACHE_TTL;
use crate::data::{DateRange, NormalizedFixture};
use crate::error::CacheError;

/// Manages reading and writing cached data to disk
///
/// Each entry is a single `<key>.json` file whose content is the cached value
/// and nothing else. An entry older than the TTL is deleted by the read that
/// finds it; there is no background sweep.
///
/// There is no locking. Two processes sharing a directory may see a transient
/// miss or a torn read while one of them rewrites an entry.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    /// Creates a CacheManager rooted at `cache_dir` with the default 30 minute TTL
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            ttl: DEFAULT_CACHE_TTL,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache key for a league and date range, e.g. `liga_mx_2025-01-01_2025-01-31`
    pub fn fixture_key(league_key: &str, range: &DateRange) -> String {
        format!("{}_{}_{}", league_key, range.from, range.to)
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| CacheError::io(&self.cache_dir, e))
    }

    /// Writes data to the cache, replacing any existing entry
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let json = serde_json::to_string(data)?;
        let path = self.cache_path(key);
        fs::write(&path, json).map_err(|e| CacheError::io(path, e))
    }

    /// Reads a fresh entry from the cache
    ///
    /// Returns `Ok(None)` when the entry is missing, expired (the file is
    /// removed), or unreadable as `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.cache_path(key);

        let Some(written_at) = self.modified_at(&path)? else {
            debug!(key, "Cache miss");
            return Ok(None);
        };

        if self.is_stale(written_at) {
            debug!(key, %written_at, "Cache entry expired, removing");
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io(path, e)),
            }
            return Ok(None);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(key, "Ignoring unreadable cache entry: {e}");
                Ok(None)
            }
        }
    }

    /// Whether a fresh entry exists for `key`, without touching it
    pub fn is_fresh(&self, key: &str) -> bool {
        match self.modified_at(&self.cache_path(key)) {
            Ok(Some(written_at)) => !self.is_stale(written_at),
            _ => false,
        }
    }

    /// Normalized fixtures cached for a league and range
    pub fn lookup(
        &self,
        league_key: &str,
        range: &DateRange,
    ) -> Result<Option<Vec<NormalizedFixture>>, CacheError> {
        self.read(&Self::fixture_key(league_key, range))
    }

    /// Stores normalized fixtures for a league and range
    pub fn store(
        &self,
        league_key: &str,
        range: &DateRange,
        fixtures: &[NormalizedFixture],
    ) -> Result<(), CacheError> {
        self.write(&Self::fixture_key(league_key, range), fixtures)
    }

    /// Deletes every fixture entry of `league_key`, or every entry when `None`
    ///
    /// Returns the number of files removed. A missing directory clears nothing.
    pub fn clear(&self, league_key: Option<&str>) -> Result<usize, CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(CacheError::io(&self.cache_dir, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(&self.cache_dir, e))?;
            let path = entry.path();
            let Some(stem) = json_stem(&path) else {
                continue;
            };

            let matches = match league_key {
                Some(league) => belongs_to_league(stem, league),
                None => true,
            };
            if !matches {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io(path, e)),
            }
        }

        debug!(league = league_key.unwrap_or("*"), removed, "Cleared cache entries");
        Ok(removed)
    }

    fn modified_at(&self, path: &Path) -> Result<Option<DateTime<Utc>>, CacheError> {
        match fs::metadata(path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| CacheError::io(path, e))?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// An entry is stale once its age strictly exceeds the TTL
    fn is_stale(&self, written_at: DateTime<Utc>) -> bool {
        match (self.clock.now() - written_at).to_std() {
            Ok(age) => age > self.ttl,
            // Written "in the future" relative to our clock
            Err(_) => false,
        }
    }
}

fn json_stem(path: &Path) -> Option<&str> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()
}

/// Matches `<league>_<from>_<to>` exactly, so `mls` does not claim `mls_next_...`
fn belongs_to_league(stem: &str, league: &str) -> bool {
    let Some(rest) = stem
        .strip_prefix(league)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    match rest.split_once('_') {
        Some((from, to)) => is_date(from) && is_date(to),
        None => false,
    }
}

fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
