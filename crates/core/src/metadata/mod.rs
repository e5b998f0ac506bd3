//! Metadata provider integration for AniList and Jikan.
//!
//! Both providers are queried only for their trailer objects. AniList is the
//! primary source and accepts batches of ids; Jikan is the fallback and is
//! queried one MyAnimeList id at a time.

mod anilist;
mod jikan;
mod types;

pub use anilist::AniListClient;
pub use jikan::JikanClient;
pub use types::*;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::trailer::TrailerSource;
use crate::upstream::RateLimitSignal;

/// Errors that can occur when interacting with metadata providers.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// GraphQL response carried an `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl RateLimitSignal for MetadataError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, MetadataError::RateLimitExceeded)
    }
}

/// A metadata service that can report trailers for catalog ids.
#[async_trait]
pub trait TrailerProvider: Send + Sync {
    /// Provenance attached to trailers from this provider.
    fn source(&self) -> TrailerSource;

    /// Largest number of ids accepted by one `fetch_trailers` call.
    fn max_batch_size(&self) -> usize;

    /// Fetch trailers for the given provider ids.
    ///
    /// Ids without a trailer are absent from the returned map. An error
    /// fails the whole batch.
    async fn fetch_trailers(
        &self,
        ids: &[u64],
    ) -> Result<HashMap<u64, RawTrailer>, MetadataError>;
}

/// Maps MyAnimeList ids to AniList ids.
#[async_trait]
pub trait MalIdLookup: Send + Sync {
    /// Look up the AniList id of an anime by its MyAnimeList id.
    async fn anilist_id_for_mal(&self, mal_id: u64) -> Result<Option<u64>, MetadataError>;
}
