//! Client-side rate limiting
//!
//! A governor token bucket paces outgoing requests. On top of it the limiter
//! can honour the server's own budget: once a response reports
//! `RateLimit-Remaining: 0`, further requests wait for `RateLimit-Reset`.

use crate::response::RateLimit;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Longest pause taken on behalf of a server reset time
const MAX_SERVER_PAUSE: Duration = Duration::from_secs(60);

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back, defaults to `requests_per_second`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_size: Option<u32>,
    /// Pause when the server reports an exhausted budget
    #[serde(default = "default_respect_server")]
    pub respect_server_limits: bool,
}

fn default_respect_server() -> bool {
    true
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(10)
    }
}

impl RateLimiterConfig {
    /// Steady rate with a burst equal to the rate
    pub fn per_second(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            burst_size: None,
            respect_server_limits: true,
        }
    }

    /// Steady rate with an explicit burst
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            burst_size: Some(burst_size),
            ..Self::per_second(requests_per_second)
        }
    }

    /// Spread a per-minute budget, as GitLab documents its limits
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::per_second(requests_per_minute.div_ceil(60))
    }

    fn burst(&self) -> u32 {
        self.burst_size.unwrap_or(self.requests_per_second)
    }
}

/// Token bucket rate limiter shared by clones of a client
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    paused_until: Arc<Mutex<Option<Instant>>>,
    respect_server: bool,
}

impl RateLimiter {
    /// Create a new rate limiter; zero values are raised to one
    pub fn new(config: &RateLimiterConfig) -> Self {
        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst()).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rps).allow_burst(burst);

        Self {
            limiter: Arc::new(Governor::direct(quota)),
            paused_until: Arc::new(Mutex::new(None)),
            respect_server: config.respect_server_limits,
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        if let Some(until) = self.pause_deadline() {
            debug!("Server rate limit exhausted, waiting {:?}", until - Instant::now());
            tokio::time::sleep_until(until).await;
        }
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.pause_deadline().is_none() && self.limiter.check().is_ok()
    }

    /// Record the budget a response reported
    pub fn observe(&self, limits: &RateLimit) {
        if !self.respect_server || limits.remaining != Some(0) {
            return;
        }
        let Some(reset) = limits.reset else {
            return;
        };
        let wait = (reset - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
            .min(MAX_SERVER_PAUSE);
        if wait.is_zero() {
            return;
        }

        warn!(limit = ?limits.limit, "Server rate limit exhausted, pausing {:?}", wait);
        if let Ok(mut paused) = self.paused_until.lock() {
            let until = Instant::now() + wait;
            *paused = Some(paused.map_or(until, |current| current.max(until)));
        }
    }

    fn pause_deadline(&self) -> Option<Instant> {
        let mut paused = self.paused_until.lock().ok()?;
        match *paused {
            Some(until) if until > Instant::now() => Some(until),
            Some(_) => {
                *paused = None;
                None
            }
            None => None,
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("respect_server", &self.respect_server)
            .finish_non_exhaustive()
    }
}
