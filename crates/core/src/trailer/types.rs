//! Canonical trailer types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The only video platform trailers are resolved against.
pub const VIDEO_SITE: &str = "youtube";

/// Where a trailer candidate came from.
///
/// Provenance is kept for diagnostics only; two candidates pointing at the
/// same video are the same trailer regardless of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrailerSource {
    /// AniList GraphQL metadata.
    Anilist,
    /// Jikan (MyAnimeList) REST metadata.
    Jikan,
    /// Found by searching the video platform.
    SearchFallback,
    /// Already stored in the catalog without a recognised provenance.
    Catalog,
}

impl TrailerSource {
    /// Label written to the catalog `source` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailerSource::Anilist => "anilist",
            TrailerSource::Jikan => "jikan",
            TrailerSource::SearchFallback => "search-fallback",
            TrailerSource::Catalog => "catalog",
        }
    }

    /// Parse a stored `source` label. Older catalogs wrote `youtube-search`
    /// for search results.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "anilist" => TrailerSource::Anilist,
            "jikan" => TrailerSource::Jikan,
            "search-fallback" | "youtube-search" => TrailerSource::SearchFallback,
            _ => TrailerSource::Catalog,
        }
    }
}

impl fmt::Display for TrailerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trailer reference with a resolved video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerCandidate {
    /// Platform video id (11 characters on YouTube).
    pub video_id: String,
    /// Canonical watch URL.
    pub url: String,
    /// URL usable inside an iframe.
    pub embed_url: String,
    pub thumbnail: String,
    pub source: TrailerSource,
}

impl TrailerCandidate {
    /// Build a candidate with every URL derived from the video id.
    pub fn from_video_id(video_id: impl Into<String>, source: TrailerSource) -> Self {
        let video_id = video_id.into();
        Self {
            url: watch_url(&video_id),
            embed_url: embed_url(&video_id),
            thumbnail: thumbnail_url(&video_id),
            video_id,
            source,
        }
    }
}

/// Stored shape of a trailer inside a catalog entry.
///
/// Every field is optional because catalogs written by older tools may hold
/// partial trailers (a Jikan URL without an id, for instance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TrailerRecord {
    /// Whether the record carries any usable id or URL.
    pub fn has_signal(&self) -> bool {
        [&self.id, &self.url, &self.embed_url]
            .iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

impl From<&TrailerCandidate> for TrailerRecord {
    fn from(candidate: &TrailerCandidate) -> Self {
        Self {
            site: Some(VIDEO_SITE.to_string()),
            id: Some(candidate.video_id.clone()),
            url: Some(candidate.url.clone()),
            embed_url: Some(candidate.embed_url.clone()),
            thumbnail: Some(candidate.thumbnail.clone()),
            source: Some(candidate.source.as_str().to_string()),
        }
    }
}

impl From<&TrailerRecord> for Value {
    /// Catalog JSON for the record, skipping unset fields.
    fn from(record: &TrailerRecord) -> Self {
        let fields = [
            ("site", &record.site),
            ("id", &record.id),
            ("url", &record.url),
            ("embedUrl", &record.embed_url),
            ("thumbnail", &record.thumbnail),
            ("source", &record.source),
        ];

        let mut map = Map::new();
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        Value::Object(map)
    }
}

/// `https://www.youtube.com/watch?v={id}`
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// `https://www.youtube.com/embed/{id}`
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}

/// `https://i.ytimg.com/vi/{id}/hqdefault.jpg`
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}
