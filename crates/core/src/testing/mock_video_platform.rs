//! Mock video platform for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::youtube::{PlatformError, VideoPlatform};

/// Mock implementation of the VideoPlatform trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured watch and search pages
/// - Track requested video ids and queries for assertions
/// - Simulate failing fetches and slow responses
///
/// Unknown watch pages answer 404; unknown search queries answer an empty
/// results page.
///
/// # Example
///
/// ```rust,ignore
/// use anitrail_core::testing::{MockVideoPlatform, fixtures};
///
/// let platform = MockVideoPlatform::new();
/// platform.set_watch_page("abc12345678", fixtures::blocked_watch_page()).await;
/// platform
///     .set_search_page("Frieren official trailer", fixtures::search_page_html(&["xyz98765432"]))
///     .await;
///
/// // ... run the resolver ...
///
/// assert_eq!(platform.watch_request_count("abc12345678").await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockVideoPlatform {
    watch_pages: Arc<RwLock<HashMap<String, String>>>,
    search_pages: Arc<RwLock<HashMap<String, String>>>,
    /// Status codes returned instead of a page, keyed by video id.
    watch_failures: Arc<RwLock<HashMap<String, u16>>>,
    /// Status codes returned instead of a page, keyed by query.
    search_failures: Arc<RwLock<HashMap<String, u16>>>,
    watch_requests: Arc<RwLock<Vec<String>>>,
    search_requests: Arc<RwLock<Vec<String>>>,
    fetch_delay: Arc<RwLock<Option<Duration>>>,
}

impl MockVideoPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` as the watch page of `video_id`.
    pub async fn set_watch_page(&self, video_id: &str, html: String) {
        self.watch_pages
            .write()
            .await
            .insert(video_id.to_string(), html);
    }

    /// Serve `body` as the search results for `query`.
    pub async fn set_search_page(&self, query: &str, body: String) {
        self.search_pages
            .write()
            .await
            .insert(query.to_string(), body);
    }

    /// Make watch page fetches for `video_id` fail with `status`.
    pub async fn fail_watch_page(&self, video_id: &str, status: u16) {
        self.watch_failures
            .write()
            .await
            .insert(video_id.to_string(), status);
    }

    /// Make search fetches for `query` fail with `status`.
    pub async fn fail_search(&self, query: &str, status: u16) {
        self.search_failures
            .write()
            .await
            .insert(query.to_string(), status);
    }

    /// Clear all configured failures.
    pub async fn clear_failures(&self) {
        self.watch_failures.write().await.clear();
        self.search_failures.write().await.clear();
    }

    /// Delay every fetch by `delay`.
    pub async fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.write().await = Some(delay);
    }

    /// Video ids whose watch page was requested, in order.
    pub async fn watch_requests(&self) -> Vec<String> {
        self.watch_requests.read().await.clone()
    }

    pub async fn watch_request_count(&self, video_id: &str) -> usize {
        self.watch_requests
            .read()
            .await
            .iter()
            .filter(|id| id.as_str() == video_id)
            .count()
    }

    pub async fn total_watch_requests(&self) -> usize {
        self.watch_requests.read().await.len()
    }

    /// Search queries requested, in order.
    pub async fn search_requests(&self) -> Vec<String> {
        self.search_requests.read().await.clone()
    }

    async fn simulate_latency(&self) {
        let delay = *self.fetch_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn status_error(status: u16) -> PlatformError {
    if status == 429 {
        PlatformError::RateLimitExceeded
    } else {
        PlatformError::Status(status)
    }
}

#[async_trait]
impl VideoPlatform for MockVideoPlatform {
    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, PlatformError> {
        self.watch_requests
            .write()
            .await
            .push(video_id.to_string());
        self.simulate_latency().await;

        if let Some(status) = self.watch_failures.read().await.get(video_id) {
            return Err(status_error(*status));
        }

        self.watch_pages
            .read()
            .await
            .get(video_id)
            .cloned()
            .ok_or(PlatformError::Status(404))
    }

    async fn fetch_search_page(&self, query: &str) -> Result<String, PlatformError> {
        self.search_requests.write().await.push(query.to_string());
        self.simulate_latency().await;

        if let Some(status) = self.search_failures.read().await.get(query) {
            return Err(status_error(*status));
        }

        Ok(self
            .search_pages
            .read()
            .await
            .get(query)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_configured_pages() {
        let platform = MockVideoPlatform::new();
        platform
            .set_watch_page("abc12345678", fixtures::embeddable_watch_page())
            .await;

        let html = platform.fetch_watch_page("abc12345678").await.unwrap();
        assert!(html.contains("ytInitialPlayerResponse = "));
        assert!(matches!(
            platform.fetch_watch_page("unknown0000").await,
            Err(PlatformError::Status(404))
        ));
        assert_eq!(platform.watch_request_count("abc12345678").await, 1);
        assert_eq!(platform.total_watch_requests().await, 2);
    }

    #[tokio::test]
    async fn test_failures() {
        let platform = MockVideoPlatform::new();
        platform.fail_search("x trailer", 429).await;

        assert!(matches!(
            platform.fetch_search_page("x trailer").await,
            Err(PlatformError::RateLimitExceeded)
        ));

        platform.clear_failures().await;
        assert!(platform.fetch_search_page("x trailer").await.is_ok());
        assert_eq!(platform.search_requests().await, vec!["x trailer", "x trailer"]);
    }
}
