//! Raw trailer payloads as the metadata providers return them.

use serde::{Deserialize, Serialize};

/// AniList `Media.trailer` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AniListTrailer {
    /// Video id on the hosting site.
    #[serde(default)]
    pub id: Option<String>,
    /// Hosting site, e.g. "youtube" or "dailymotion".
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Jikan `data.trailer` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JikanTrailer {
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}

/// A provider trailer payload tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTrailer {
    AniList(AniListTrailer),
    Jikan(JikanTrailer),
}

impl From<AniListTrailer> for RawTrailer {
    fn from(trailer: AniListTrailer) -> Self {
        RawTrailer::AniList(trailer)
    }
}

impl From<JikanTrailer> for RawTrailer {
    fn from(trailer: JikanTrailer) -> Self {
        RawTrailer::Jikan(trailer)
    }
}
