//! Per-fetcher start-rate limiter
//!
//! Sliding window of call starts: at most `requests` starts in any window of
//! `period`. Each start frees its place exactly `period` after it was taken.

use crate::config::RateConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    requests: usize,
    period: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// A limiter allowing `requests` starts per `period`
    ///
    /// A zero request count is treated as one.
    pub fn new(requests: usize, period: Duration) -> Self {
        let requests = requests.max(1);
        Self {
            requests,
            period,
            starts: Mutex::new(VecDeque::with_capacity(requests)),
        }
    }

    pub fn from_config(config: &RateConfig) -> Self {
        Self::new(config.requests, Duration::from_millis(config.period_ms))
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits until a start is allowed and records it
    ///
    /// Dropping the future before it resolves reserves nothing.
    pub async fn acquire(&self) {
        loop {
            let ready_at = {
                let mut starts = self.starts.lock().await;
                let now = Instant::now();
                while starts
                    .front()
                    .is_some_and(|start| now.duration_since(*start) >= self.period)
                {
                    starts.pop_front();
                }

                if starts.len() < self.requests {
                    starts.push_back(now);
                    return;
                }
                starts
                    .front()
                    .map_or(now, |oldest| *oldest + self.period)
            };
            sleep_until(ready_at).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity_is_immediate() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let begin = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(Instant::now(), begin);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_oldest_start_to_expire() {
        let limiter = RateLimiter::new(2, Duration::from_millis(500));
        let begin = Instant::now();

        limiter.acquire().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(Instant::now() - begin, Duration::from_millis(500));

        limiter.acquire().await;
        assert_eq!(Instant::now() - begin, Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_requests_is_one() {
        let limiter = RateLimiter::new(0, Duration::from_millis(10));
        assert_eq!(limiter.requests(), 1);
        let begin = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(Instant::now() - begin, Duration::from_millis(10));
    }

    #[test]
    fn test_from_config() {
        let limiter = RateLimiter::from_config(&RateConfig {
            requests: 12,
            period_ms: 1000,
        });
        assert_eq!(limiter.requests(), 12);
        assert_eq!(limiter.period(), Duration::from_secs(1));
    }
}
