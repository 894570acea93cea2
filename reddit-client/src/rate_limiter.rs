use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Longest pause any server hint may impose. Reddit's window is ten minutes.
pub const MAX_SERVER_PAUSE: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub time_window: Duration,
    pub burst_allowance: u32,
}

impl RateLimitConfig {
    pub fn reddit_oauth() -> Self {
        Self {
            max_requests: 100, // Reddit allows 100 requests per minute for OAuth2
            time_window: Duration::from_secs(60),
            burst_allowance: 10,
        }
    }

    fn refill_rate(&self) -> f64 {
        self.max_requests as f64 / self.time_window.as_secs_f64()
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
    /// Set when Reddit reports an exhausted budget; no requests go out before it.
    paused_until: Option<Instant>,
}

impl BucketState {
    fn refill(&mut self, now: Instant, capacity: f64, refill_rate: f64) {
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * refill_rate).min(capacity);
        self.last_refill = now;
    }
}

/// Token bucket limiter shared by every request of one client.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPermit {
    pub queue_wait_time: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub available_tokens: u32,
    pub max_tokens: u32,
    pub requests_per_minute: u32,
    pub paused_for: Option<Duration>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let state = BucketState {
            tokens: config.burst_allowance as f64,
            last_refill: Instant::now(),
            paused_until: None,
        };

        Self {
            config,
            state: Mutex::new(state),
        }
    }

    /// Takes a token without waiting, or reports how long until one is available.
    pub async fn try_acquire(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        if let Some(until) = state.paused_until {
            if until > now {
                return Err(until - now);
            }
            state.paused_until = None;
        }

        let refill_rate = self.config.refill_rate();
        state.refill(now, self.config.burst_allowance as f64, refill_rate);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - state.tokens) / refill_rate))
        }
    }

    /// Waits until a request may be sent.
    pub async fn acquire_permit(&self) -> RateLimitPermit {
        let start_time = Instant::now();

        while let Err(wait_time) = self.try_acquire().await {
            tracing::debug!("Rate limit reached, waiting {:?}", wait_time);
            sleep(wait_time).await;
        }

        RateLimitPermit {
            queue_wait_time: start_time.elapsed(),
        }
    }

    /// Applies the budget Reddit reports in its `x-ratelimit-*` headers.
    pub async fn record_server_budget(&self, remaining: Option<f64>, reset: Option<Duration>) {
        if let (Some(remaining), Some(reset)) = (remaining, reset) {
            if remaining < 1.0 {
                tracing::warn!("Reddit request budget exhausted, pausing for {:?}", reset);
                self.pause_for(reset).await;
            }
        }
    }

    /// Blocks new requests for `duration`, capped at [`MAX_SERVER_PAUSE`].
    pub async fn pause_for(&self, duration: Duration) {
        let now = Instant::now();
        let until = now
            .checked_add(duration.min(MAX_SERVER_PAUSE))
            .unwrap_or(now);
        let mut state = self.state.lock().await;
        state.paused_until = Some(state.paused_until.map_or(until, |current| current.max(until)));
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.refill(
            now,
            self.config.burst_allowance as f64,
            self.config.refill_rate(),
        );

        RateLimitStatus {
            available_tokens: state.tokens as u32,
            max_tokens: self.config.burst_allowance,
            requests_per_minute: self.config.max_requests,
            paused_for: state
                .paused_until
                .filter(|until| *until > now)
                .map(|until| until - now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_allowance() {
        let config = RateLimitConfig {
            max_requests: 10,
            time_window: Duration::from_secs(10),
            burst_allowance: 5,
        };
        let limiter = RateLimiter::new(config);

        for _ in 0..5 {
            assert!(limiter.try_acquire().await.is_ok());
        }

        let wait = limiter.try_acquire().await.unwrap_err();
        assert!(wait <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_refill() {
        let config = RateLimitConfig {
            max_requests: 60, // 1 token per second
            time_window: Duration::from_secs(60),
            burst_allowance: 1,
        };
        let limiter = RateLimiter::new(config);

        assert!(limiter.try_acquire().await.is_ok());
        assert!(limiter.try_acquire().await.is_err());

        sleep(Duration::from_millis(1100)).await;
        assert!(limiter.try_acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_server_budget_pauses_requests() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());

        limiter
            .record_server_budget(Some(5.0), Some(Duration::from_secs(30)))
            .await;
        assert!(limiter.try_acquire().await.is_ok());

        limiter
            .record_server_budget(Some(0.0), Some(Duration::from_secs(30)))
            .await;
        let wait = limiter.try_acquire().await.unwrap_err();
        assert!(wait > Duration::from_secs(25));

        let status = limiter.get_rate_limit_status().await;
        assert!(status.paused_for.is_some());
    }

    #[tokio::test]
    async fn test_oversized_pause_is_capped() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());

        limiter.pause_for(Duration::from_secs(u64::MAX)).await;
        let wait = limiter.try_acquire().await.unwrap_err();
        assert!(wait <= MAX_SERVER_PAUSE);
        assert!(wait > MAX_SERVER_PAUSE - Duration::from_secs(5));

        limiter.pause_for(Duration::MAX).await;
        let status = limiter.get_rate_limit_status().await;
        assert!(status.paused_for.is_some_and(|p| p <= MAX_SERVER_PAUSE));
    }

    #[tokio::test]
    async fn test_status_and_permit() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());
        let permit = limiter.acquire_permit().await;
        assert!(permit.queue_wait_time < Duration::from_secs(1));

        let status = limiter.get_rate_limit_status().await;
        assert!(status.available_tokens <= status.max_tokens);
        assert_eq!(status.requests_per_minute, 100);
        assert!(status.paused_for.is_none());
    }
}
