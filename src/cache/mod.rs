//! Cache module for storing normalized fixtures to disk
//!
//! This module provides a cache manager that persists fixture lists to the
//! filesystem, one JSON file per (league, date range). Entries expire 30 minutes
//! after they were last written and are removed lazily by the read that finds
//! them stale.

mod manager;

pub use manager::CacheManager;
