//! matchday library
//!
//! Fetches football fixtures from API-Football, normalizes them and caches the
//! result on disk. `MatchesService` is the entry point; the other modules are
//! exposed for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod service;

pub use error::{CacheError, ConfigError, FetchError, ServiceError};
pub use service::{MatchOptions, MatchesService};
