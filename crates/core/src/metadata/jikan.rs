//! Jikan (unofficial MyAnimeList) REST client.
//!
//! Jikan allows 3 requests per second and 60 per minute.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::types::{JikanTrailer, RawTrailer};
use super::{MetadataError, TrailerProvider};
use crate::config::JikanConfig;
use crate::metrics;
use crate::trailer::TrailerSource;
use crate::upstream::{call_with_retry, RateLimiter, Upstream};

/// Jikan API client.
pub struct JikanClient {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl JikanClient {
    /// Create a new Jikan client.
    pub fn new(config: &JikanConfig, limiter: Arc<RateLimiter>) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    /// Get the trailer object of an anime by MyAnimeList id.
    ///
    /// Returns `Ok(None)` when the anime is unknown or has no trailer.
    pub async fn get_trailer(&self, mal_id: u64) -> Result<Option<JikanTrailer>, MetadataError> {
        let url = format!("{}/anime/{}/full", self.base_url, mal_id);

        debug!("Jikan get anime: mal_id={}", mal_id);

        let start = Instant::now();
        let result = call_with_retry(&self.limiter, Upstream::Jikan, || self.get_once(&url)).await;
        metrics::record_upstream(
            Upstream::Jikan.as_str(),
            "anime_full",
            result.is_ok(),
            start.elapsed().as_secs_f64(),
        );
        result
    }

    async fn get_once(&self, url: &str) -> Result<Option<JikanTrailer>, MetadataError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == 404 {
            return Ok(None);
        }
        if status == 429 {
            return Err(MetadataError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let anime: JikanAnimeResponse = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse anime response: {}", e))
        })?;

        Ok(anime.data.and_then(|d| d.trailer))
    }
}

#[async_trait]
impl TrailerProvider for JikanClient {
    fn source(&self) -> TrailerSource {
        TrailerSource::Jikan
    }

    fn max_batch_size(&self) -> usize {
        1
    }

    async fn fetch_trailers(
        &self,
        ids: &[u64],
    ) -> Result<HashMap<u64, RawTrailer>, MetadataError> {
        let mut trailers = HashMap::new();
        for &mal_id in ids {
            if let Some(trailer) = self.get_trailer(mal_id).await? {
                trailers.insert(mal_id, RawTrailer::Jikan(trailer));
            }
        }
        Ok(trailers)
    }
}

// ============================================================================
// Jikan API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct JikanAnimeResponse {
    data: Option<JikanAnime>,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    #[serde(default)]
    trailer: Option<JikanTrailer>,
}
