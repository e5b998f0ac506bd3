//! Minimum-interval rate limiter, one slot per upstream.
//!
//! Each upstream keeps the instant at which its next call may start. A call
//! reserves that slot and pushes it forward by the upstream's interval, so
//! callers are spaced out even when they arrive together.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use super::Upstream;
use crate::config::Config;

/// Spacing and backoff rules for one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPolicy {
    /// Minimum time between two consecutive calls.
    pub min_interval: Duration,
    /// Extra wait after an explicit "too many requests" response.
    pub cooldown: Duration,
}

impl UpstreamPolicy {
    pub fn new(min_interval: Duration, cooldown: Duration) -> Self {
        Self {
            min_interval,
            cooldown,
        }
    }

    /// Default policy for an upstream.
    pub fn default_for(upstream: Upstream) -> Self {
        match upstream {
            Upstream::AniList => Self::new(Duration::from_millis(700), Duration::from_secs(60)),
            Upstream::Jikan => Self::new(Duration::from_millis(400), Duration::from_secs(5)),
            Upstream::YouTube => Self::new(Duration::from_millis(500), Duration::from_secs(5)),
        }
    }
}

/// Per-upstream rate limiter.
///
/// Upstreams are independent: waiting on one never delays another.
pub struct RateLimiter {
    policies: HashMap<Upstream, UpstreamPolicy>,
    next_slot: Mutex<HashMap<Upstream, Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given policies. Upstreams without an
    /// explicit policy use [`UpstreamPolicy::default_for`].
    pub fn new(policies: impl IntoIterator<Item = (Upstream, UpstreamPolicy)>) -> Self {
        Self {
            policies: policies.into_iter().collect(),
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Limiter with the intervals and cooldowns from configuration.
    pub fn from_config(config: &Config) -> Self {
        let policy = |interval_ms: u64, cooldown_secs: u64| {
            UpstreamPolicy::new(
                Duration::from_millis(interval_ms),
                Duration::from_secs(cooldown_secs),
            )
        };
        Self::new([
            (
                Upstream::AniList,
                policy(config.anilist.min_interval_ms, config.anilist.cooldown_secs),
            ),
            (
                Upstream::Jikan,
                policy(config.jikan.min_interval_ms, config.jikan.cooldown_secs),
            ),
            (
                Upstream::YouTube,
                policy(config.youtube.min_interval_ms, config.youtube.cooldown_secs),
            ),
        ])
    }

    /// Limiter that never waits. Useful in tests.
    pub fn unlimited() -> Self {
        let zero = UpstreamPolicy::new(Duration::ZERO, Duration::ZERO);
        Self::new(Upstream::ALL.into_iter().map(|u| (u, zero)))
    }

    /// Policy in effect for an upstream.
    pub fn policy(&self, upstream: Upstream) -> UpstreamPolicy {
        self.policies
            .get(&upstream)
            .copied()
            .unwrap_or_else(|| UpstreamPolicy::default_for(upstream))
    }

    /// Sleep until a call to `upstream` is allowed, then record it.
    pub async fn wait(&self, upstream: Upstream) {
        let interval = self.policy(upstream).min_interval;

        let delay = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = slots
                .get(&upstream)
                .copied()
                .filter(|slot| *slot > now)
                .unwrap_or(now);
            slots.insert(upstream, slot + interval);
            slot.saturating_duration_since(now)
        };

        if !delay.is_zero() {
            debug!(upstream = %upstream, delay_ms = delay.as_millis() as u64, "Rate limiting");
            sleep(delay).await;
        }
    }

    /// Sleep for the upstream's rate-limit cooldown.
    pub async fn cool_down(&self, upstream: Upstream) {
        let cooldown = self.policy(upstream).cooldown;
        debug!(upstream = %upstream, cooldown_ms = cooldown.as_millis() as u64, "Cooling down");
        sleep(cooldown).await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policies", &self.policies)
            .finish()
    }
}
