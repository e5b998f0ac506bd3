//! Embeddability verification.
//!
//! A video counts as a usable trailer only when its watch page says it can
//! be played inside an iframe. Every failure along the way (fetch, marker,
//! JSON) is a `NotEmbeddable` verdict, and verdicts are memoized for the
//! whole run.

mod verdict;

pub use verdict::{verdict_from_page, verdict_from_player_response, EmbedVerdict, VerdictError};

use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::RunCache;
use crate::metrics;
use crate::youtube::VideoPlatform;

/// Checks whether videos can be embedded, once per video id per run.
pub struct EmbeddabilityVerifier {
    platform: Arc<dyn VideoPlatform>,
    cache: Arc<RunCache>,
}

impl EmbeddabilityVerifier {
    pub fn new(platform: Arc<dyn VideoPlatform>, cache: Arc<RunCache>) -> Self {
        Self { platform, cache }
    }

    /// Whether the video can be embedded. Never fails.
    pub async fn is_embeddable(&self, video_id: &str) -> bool {
        self.verdict(video_id).await.is_embeddable()
    }

    /// Verdict for a video id.
    ///
    /// Concurrent callers for the same id share a single watch page fetch.
    pub async fn verdict(&self, video_id: &str) -> EmbedVerdict {
        let slot = self.cache.verdict_slot(video_id).await;

        let mut fetched = false;
        let fetched_here = &mut fetched;
        let verdict = *slot
            .get_or_init(|| async move {
                *fetched_here = true;
                self.check(video_id).await
            })
            .await;

        let cached = if fetched { "false" } else { "true" };
        metrics::VERIFICATIONS
            .with_label_values(&[verdict.as_str(), cached])
            .inc();

        verdict
    }

    async fn check(&self, video_id: &str) -> EmbedVerdict {
        let html = match self.platform.fetch_watch_page(video_id).await {
            Ok(html) => html,
            Err(e) => {
                warn!(video_id, error = %e, "Watch page fetch failed, treating as not embeddable");
                return EmbedVerdict::NotEmbeddable;
            }
        };

        match verdict_from_page(&html) {
            Ok(verdict) => {
                debug!(video_id, verdict = verdict.as_str(), "Verified embeddability");
                verdict
            }
            Err(e) => {
                warn!(video_id, error = %e, "Unreadable watch page, treating as not embeddable");
                EmbedVerdict::NotEmbeddable
            }
        }
    }
}
