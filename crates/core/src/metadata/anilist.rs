//! AniList GraphQL client.
//!
//! AniList allows around 90 requests per minute and answers bursts with
//! HTTP 429, after which it expects a long pause.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::types::{AniListTrailer, RawTrailer};
use super::{MalIdLookup, MetadataError, TrailerProvider};
use crate::config::AniListConfig;
use crate::metrics;
use crate::trailer::TrailerSource;
use crate::upstream::{call_with_retry, RateLimiter, Upstream};

const TRAILER_BATCH_QUERY: &str = r#"
query ($ids: [Int]) {
  Page(perPage: 50) {
    media(id_in: $ids, type: ANIME) {
      id
      trailer {
        id
        site
        thumbnail
      }
    }
  }
}
"#;

const MAL_ID_QUERY: &str = r#"
query ($malId: Int) {
  Media(idMal: $malId, type: ANIME) {
    id
  }
}
"#;

/// AniList API client.
pub struct AniListClient {
    client: Client,
    base_url: String,
    batch_size: usize,
    limiter: Arc<RateLimiter>,
}

impl AniListClient {
    /// Create a new AniList client.
    pub fn new(config: &AniListConfig, limiter: Arc<RateLimiter>) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            batch_size: config.batch_size,
            limiter,
        })
    }

    /// Fetch trailers for up to one page of AniList ids.
    pub async fn fetch_trailer_batch(
        &self,
        ids: &[u64],
    ) -> Result<HashMap<u64, AniListTrailer>, MetadataError> {
        debug!("AniList trailer batch: {} ids", ids.len());

        let data: PageData = self
            .graphql(
                "trailer_batch",
                TRAILER_BATCH_QUERY,
                json!({ "ids": ids }),
            )
            .await?;

        let media = data.page.map(|p| p.media).unwrap_or_default();
        Ok(media
            .into_iter()
            .filter_map(|m| Some((m.id?, m.trailer?)))
            .collect())
    }

    /// Look up the AniList id for a MyAnimeList id.
    pub async fn find_by_mal_id(&self, mal_id: u64) -> Result<Option<u64>, MetadataError> {
        debug!("AniList id lookup: mal_id={}", mal_id);

        let result = self
            .graphql::<MediaData>("mal_lookup", MAL_ID_QUERY, json!({ "malId": mal_id }))
            .await;

        match result {
            Ok(data) => Ok(data.media.and_then(|m| m.id)),
            // Unknown ids are answered with 404 and a "Not Found." error
            Err(MetadataError::ApiError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST a GraphQL query under the AniList rate limit.
    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, MetadataError> {
        let body = json!({ "query": query, "variables": variables });
        let start = Instant::now();

        let result = call_with_retry(&self.limiter, Upstream::AniList, || {
            self.post_once::<T>(&body)
        })
        .await;

        metrics::record_upstream(
            Upstream::AniList.as_str(),
            operation,
            result.is_ok(),
            start.elapsed().as_secs_f64(),
        );
        result
    }

    async fn post_once<T: DeserializeOwned>(&self, body: &Value) -> Result<T, MetadataError> {
        let response = self.client.post(&self.base_url).json(body).send().await?;

        let status = response.status();
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

        let payload: GraphQlResponse<T> = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse AniList response: {}", e))
        })?;

        payload.into_result()
    }
}

#[async_trait]
impl TrailerProvider for AniListClient {
    fn source(&self) -> TrailerSource {
        TrailerSource::Anilist
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn fetch_trailers(
        &self,
        ids: &[u64],
    ) -> Result<HashMap<u64, RawTrailer>, MetadataError> {
        let mut trailers = HashMap::new();
        for chunk in ids.chunks(self.batch_size.max(1)) {
            let batch = self.fetch_trailer_batch(chunk).await?;
            trailers.extend(batch.into_iter().map(|(id, t)| (id, RawTrailer::AniList(t))));
        }
        Ok(trailers)
    }
}

#[async_trait]
impl MalIdLookup for AniListClient {
    async fn anilist_id_for_mal(&self, mal_id: u64) -> Result<Option<u64>, MetadataError> {
        self.find_by_mal_id(mal_id).await
    }
}

// ============================================================================
// AniList API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

impl<T> GraphQlResponse<T> {
    fn into_result(self) -> Result<T, MetadataError> {
        if let Some(first) = self.errors.as_ref().and_then(|e| e.first()) {
            return Err(MetadataError::GraphQl(
                first
                    .message
                    .clone()
                    .unwrap_or_else(|| "AniList GraphQL error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| MetadataError::ParseError("AniList response has no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Option<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    media: Vec<MediaTrailer>,
}

#[derive(Debug, Deserialize)]
struct MediaTrailer {
    id: Option<u64>,
    trailer: Option<AniListTrailer>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<MediaId>,
}

#[derive(Debug, Deserialize)]
struct MediaId {
    id: Option<u64>,
}
