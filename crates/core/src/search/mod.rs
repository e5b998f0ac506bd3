//! Replacement trailers found through the video platform's search page.
//!
//! Used only after a provider trailer failed verification. Queries are tried
//! in a fixed order and the first embeddable, non-blocked video wins; there
//! is no relevance ranking beyond the platform's own result order.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::RunCache;
use crate::metrics;
use crate::trailer::{TrailerCandidate, TrailerSource};
use crate::verify::EmbeddabilityVerifier;
use crate::youtube::{scan_video_ids, VideoPlatform};

/// Default cap on candidate ids taken from one search page.
pub const DEFAULT_RESULTS_LIMIT: usize = 12;

/// Search queries for a title, in the order they are tried.
///
/// A blank title yields no queries.
pub fn fallback_queries(title: &str) -> Vec<String> {
    let title = title.trim();
    if title.is_empty() {
        return Vec::new();
    }
    vec![
        format!("{} official trailer", title),
        format!("{} trailer", title),
        format!("{} PV", title),
    ]
}

/// Finds embeddable replacement trailers by title.
pub struct SearchFallback {
    platform: Arc<dyn VideoPlatform>,
    verifier: Arc<EmbeddabilityVerifier>,
    cache: Arc<RunCache>,
    results_limit: usize,
}

impl SearchFallback {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        verifier: Arc<EmbeddabilityVerifier>,
        cache: Arc<RunCache>,
    ) -> Self {
        Self {
            platform,
            verifier,
            cache,
            results_limit: DEFAULT_RESULTS_LIMIT,
        }
    }

    /// Override how many ids are taken from each search page.
    pub fn with_results_limit(mut self, limit: usize) -> Self {
        self.results_limit = limit;
        self
    }

    /// First embeddable video for `title` whose id is not in `blocked`.
    pub async fn find_replacement(
        &self,
        title: &str,
        blocked: &HashSet<String>,
    ) -> Option<TrailerCandidate> {
        let queries = fallback_queries(title);
        if queries.is_empty() {
            debug!("No title to search for, skipping fallback");
            return None;
        }

        for query in &queries {
            for video_id in self.candidate_ids(query).await {
                if blocked.contains(&video_id) {
                    continue;
                }
                if self.verifier.is_embeddable(&video_id).await {
                    info!(query = %query, video_id = %video_id, "Found embeddable replacement");
                    return Some(TrailerCandidate::from_video_id(
                        video_id,
                        TrailerSource::SearchFallback,
                    ));
                }
            }
        }

        debug!(title, "No embeddable replacement found");
        None
    }

    /// Candidate ids for one query, from the run cache when possible.
    ///
    /// Failed fetches yield no ids and are not cached.
    pub async fn candidate_ids(&self, query: &str) -> Vec<String> {
        if let Some(ids) = self.cache.search_results(query).await {
            metrics::SEARCH_QUERIES.with_label_values(&["true"]).inc();
            return ids;
        }
        metrics::SEARCH_QUERIES.with_label_values(&["false"]).inc();

        let body = match self.platform.fetch_search_page(query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(query, error = %e, "Search page fetch failed");
                return Vec::new();
            }
        };

        let ids = scan_video_ids(&body, self.results_limit);
        metrics::SEARCH_CANDIDATES
            .with_label_values(&[])
            .observe(ids.len() as f64);
        debug!(query, candidates = ids.len(), "Scanned search page");

        self.cache.store_search_results(query, ids.clone()).await;
        ids
    }
}
