//! Upstream classes, rate limiting and the retry-once rule for
//! "too many requests" responses.

mod rate_limiter;

pub use rate_limiter::{RateLimiter, UpstreamPolicy};

use std::fmt;
use std::future::Future;
use tracing::warn;

use crate::metrics;

/// An external service with its own rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// AniList GraphQL API.
    AniList,
    /// Jikan REST API.
    Jikan,
    /// YouTube watch and search pages.
    YouTube,
}

impl Upstream {
    pub const ALL: [Upstream; 3] = [Upstream::AniList, Upstream::Jikan, Upstream::YouTube];

    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::AniList => "anilist",
            Upstream::Jikan => "jikan",
            Upstream::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can report an explicit rate-limit response.
pub trait RateLimitSignal {
    fn is_rate_limited(&self) -> bool;
}

/// Run `call` under the upstream's rate limit.
///
/// If the attempt fails with a rate-limit error, the upstream's cooldown is
/// applied and the call is retried exactly once. Whatever the retry returns
/// is final.
pub async fn call_with_retry<T, E, F, Fut>(
    limiter: &RateLimiter,
    upstream: Upstream,
    mut call: F,
) -> Result<T, E>
where
    E: RateLimitSignal,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    limiter.wait(upstream).await;
    match call().await {
        Err(e) if e.is_rate_limited() => {
            metrics::RATE_LIMIT_HITS
                .with_label_values(&[upstream.as_str()])
                .inc();
            warn!(upstream = %upstream, "Rate limited, cooling down before a single retry");
            limiter.cool_down(upstream).await;
            limiter.wait(upstream).await;
            call().await
        }
        other => other,
    }
}
