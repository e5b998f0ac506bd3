//! HTTP client for YouTube watch and search pages.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{PlatformError, VideoPlatform};
use crate::config::YouTubeConfig;
use crate::metrics;
use crate::upstream::{call_with_retry, RateLimiter, Upstream};

/// YouTube page client.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl YouTubeClient {
    /// Create a new client with browser-like headers.
    pub fn new(config: &YouTubeConfig, limiter: Arc<RateLimiter>) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| PlatformError::InvalidConfig(format!("accept_language: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    async fn get_page(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, PlatformError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let result = call_with_retry(&self.limiter, Upstream::YouTube, || {
            self.get_once(&url, query)
        })
        .await;

        metrics::record_upstream(
            Upstream::YouTube.as_str(),
            operation,
            result.is_ok(),
            start.elapsed().as_secs_f64(),
        );
        result
    }

    async fn get_once(&self, url: &str, query: &[(&str, &str)]) -> Result<String, PlatformError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == 429 {
            return Err(PlatformError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(PlatformError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, PlatformError> {
        debug!(video_id, "Fetching watch page");
        self.get_page("watch", "/watch", &[("v", video_id)]).await
    }

    async fn fetch_search_page(&self, query: &str) -> Result<String, PlatformError> {
        debug!(query, "Fetching search page");
        self.get_page("search", "/results", &[("search_query", query)])
            .await
    }
}
