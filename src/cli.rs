//! Command-line interface parsing for matchday
//!
//! This module handles parsing of CLI arguments using clap. Date arguments
//! are parsed here so a bad date fails before any request is made.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{API_KEY_ENV, CACHE_DIR_ENV};
use crate::data::DEFAULT_LEAGUE_KEYS;
use crate::service::MatchOptions;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The date is not in YYYY-MM-DD form
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// matchday - Fetch and cache football fixtures from API-Football
#[derive(Parser, Debug)]
#[command(name = "matchday")]
#[command(about = "Football fixtures from API-Football with an on-disk cache")]
#[command(version)]
pub struct Cli {
    /// RapidAPI key for API-Football
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory for cached fixture lists
    #[arg(long, global = true, env = CACHE_DIR_ENV, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fixtures for several leagues, as one aggregate result
    ///
    /// Examples:
    ///   matchday fetch                      # liga_mx and mls, next 30 days
    ///   matchday fetch la_liga --max 5
    ///   matchday fetch mls --from 2025-03-01 --to 2025-03-31 --no-cache
    Fetch {
        /// League keys (see `matchday leagues`); defaults to liga_mx and mls
        #[arg(value_name = "LEAGUE")]
        leagues: Vec<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Skip the cache for both reading and writing
        #[arg(long)]
        no_cache: bool,

        /// Keep at most N fixtures per league
        #[arg(long, value_name = "N")]
        max: Option<usize>,
    },

    /// Fixtures for a single league
    League {
        #[arg(value_name = "LEAGUE")]
        league: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Skip the cache for both reading and writing
        #[arg(long)]
        no_cache: bool,
    },

    /// List the configured leagues
    Leagues,

    /// Delete cached fixture lists, for one league or all of them
    ClearCache {
        #[arg(value_name = "LEAGUE")]
        league: Option<String>,
    },
}

/// Date range flags shared by `fetch` and `league`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day, inclusive (default: today)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last day, inclusive (default: today + 30 days)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
}

/// Parses a YYYY-MM-DD argument, ignoring surrounding whitespace
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// League keys for `fetch`, falling back to the defaults when none were given
pub fn leagues_or_default(leagues: &[String]) -> Vec<String> {
    if leagues.is_empty() {
        DEFAULT_LEAGUE_KEYS.iter().map(|key| key.to_string()).collect()
    } else {
        leagues.to_vec()
    }
}

impl RangeArgs {
    pub fn to_options(&self, no_cache: bool, max: Option<usize>) -> MatchOptions {
        MatchOptions {
            date_from: self.from,
            date_to: self.to,
            use_cache: !no_cache,
            max_matches: max,
        }
    }
}
