//! Rate-limited access to the fixture provider
//!
//! Every outbound request, whatever the league or season, passes through one
//! `RateLimiter`. The limiter holds its lock for the whole call, so calls are
//! serialized and spaced at least `min_interval` apart, measured from the end
//! of the previous call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::Clock;
use crate::data::{DateRange, FixtureSource, RawFixture};
use crate::error::FetchError;

/// Enforces a minimum delay between consecutive calls
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    /// End time of the previous call
    last_call: Mutex<Option<DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
            clock,
        }
    }

    /// Runs `call` once the minimum interval since the previous call has passed
    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            // A clock that went backwards counts as no time elapsed
            let elapsed = (self.clock.now() - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Rate limiting provider request");
                self.clock.sleep(wait).await;
            }
        }

        let output = call.await;
        *last_call = Some(self.clock.now());
        output
    }
}

/// Fixture source wrapped in the shared rate limiter
pub struct RateLimitedFetcher {
    source: Arc<dyn FixtureSource>,
    limiter: Arc<RateLimiter>,
}

impl RateLimitedFetcher {
    pub fn new(source: Arc<dyn FixtureSource>, limiter: Arc<RateLimiter>) -> Self {
        Self { source, limiter }
    }

    /// Fetch raw fixtures for one league season, waiting for the rate limit first
    pub async fn fetch_raw(
        &self,
        provider_id: u32,
        season: i32,
        range: &DateRange,
    ) -> Result<Vec<RawFixture>, FetchError> {
        self.limiter
            .run(self.source.fetch_raw(provider_id, season, range))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    fn limiter(clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(Duration::from_secs(1), clock)
    }

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = limiter(clock.clone());

        let value = limiter.run(async { 7 }).await;

        assert_eq!(value, 7);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_calls_wait_full_interval() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = limiter(clock.clone());

        limiter.run(async {}).await;
        limiter.run(async {}).await;
        limiter.run(async {}).await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_waits_only_for_remaining_time() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = limiter(clock.clone());

        limiter.run(async {}).await;
        clock.advance(Duration::from_millis(400));
        limiter.run(async {}).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(600)]);
    }

    #[tokio::test]
    async fn test_interval_measured_from_end_of_previous_call() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = limiter(clock.clone());

        // The call itself takes 5 seconds
        let slow_clock = clock.clone();
        limiter
            .run(async move { slow_clock.advance(Duration::from_secs(5)) })
            .await;
        limiter.run(async {}).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_elapsed() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = limiter(clock.clone());

        limiter.run(async {}).await;
        clock.advance(Duration::from_secs(2));
        limiter.run(async {}).await;

        assert!(clock.sleeps().is_empty());
    }

    struct RecordingSource {
        calls: StdMutex<Vec<(u32, i32)>>,
    }

    #[async_trait]
    impl FixtureSource for RecordingSource {
        async fn fetch_raw(
            &self,
            provider_id: u32,
            season: i32,
            _range: &DateRange,
        ) -> Result<Vec<RawFixture>, FetchError> {
            self.calls.lock().unwrap().push((provider_id, season));
            Ok(vec![RawFixture::default()])
        }
    }

    #[tokio::test]
    async fn test_fetcher_shares_one_cursor_across_leagues() {
        let clock = Arc::new(ManualClock::starting_now());
        let source = Arc::new(RecordingSource {
            calls: StdMutex::new(Vec::new()),
        });
        let fetcher = RateLimitedFetcher::new(source.clone(), Arc::new(limiter(clock.clone())));
        let range = DateRange::new(
            "2025-01-01".parse().unwrap(),
            "2025-01-31".parse().unwrap(),
        );

        fetcher.fetch_raw(262, 2025, &range).await.unwrap();
        fetcher.fetch_raw(253, 2025, &range).await.unwrap();
        fetcher.fetch_raw(253, 2024, &range).await.unwrap();

        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(262, 2025), (253, 2025), (253, 2024)]
        );
        assert_eq!(clock.total_slept(), Duration::from_secs(2));
    }
}
