//! YouTube page access.
//!
//! YouTube offers no API for embeddability, so the engine works from the
//! public watch and search pages. [`VideoPlatform`] is the seam between the
//! page fetching and the parsing done by the verifier and search fallback.

mod client;
mod extract;
mod scan;

pub use client::YouTubeClient;
pub use extract::{extract_embedded_json, ExtractError, PLAYER_RESPONSE_MARKER};
pub use scan::scan_video_ids;

use async_trait::async_trait;
use thiserror::Error;

use crate::upstream::RateLimitSignal;

/// Errors that can occur when fetching video platform pages.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed (timeout, connection, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The platform answered with "too many requests".
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Any other non-success status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl RateLimitSignal for PlatformError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, PlatformError::RateLimitExceeded)
    }
}

/// Source of raw watch and search pages.
///
/// Implementations apply rate limiting and the retry-once rule themselves;
/// callers see the final outcome of a fetch.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// HTML of the watch page for a video.
    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, PlatformError>;

    /// Raw body of the search results page for a query.
    async fn fetch_search_page(&self, query: &str) -> Result<String, PlatformError>;
}
