use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolver::ResolutionStrategy;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub anilist: AniListConfig,
    #[serde(default)]
    pub jikan: JikanConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
}

/// Catalog file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_input")]
    pub input: PathBuf,
    /// Output path (default: overwrite input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl CatalogConfig {
    /// Where the updated catalog is written.
    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.input)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            input: default_catalog_input(),
            output: None,
        }
    }
}

fn default_catalog_input() -> PathBuf {
    PathBuf::from("data/anime.json")
}

/// Resolution run options
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Per-entry or two-pass orchestration.
    #[serde(default)]
    pub strategy: ResolutionStrategy,
    /// Re-acquire trailers even when the entry already has one.
    #[serde(default)]
    pub refresh: bool,
    /// Only process the first N catalog entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Look up AniList ids by MAL id for entries missing one.
    #[serde(default)]
    pub lookup_missing_anilist_ids: bool,
}

/// AniList GraphQL provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AniListConfig {
    #[serde(default = "default_anilist_url")]
    pub base_url: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u32,
    /// Ids per GraphQL page request (AniList caps this at 50).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_anilist_interval")]
    pub min_interval_ms: u64,
    #[serde(default = "default_anilist_cooldown")]
    pub cooldown_secs: u64,
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            base_url: default_anilist_url(),
            timeout_secs: default_metadata_timeout(),
            batch_size: default_batch_size(),
            min_interval_ms: default_anilist_interval(),
            cooldown_secs: default_anilist_cooldown(),
        }
    }
}

fn default_anilist_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_metadata_timeout() -> u32 {
    30
}

fn default_batch_size() -> usize {
    50
}

fn default_anilist_interval() -> u64 {
    700 // 90 req/min
}

fn default_anilist_cooldown() -> u64 {
    60
}

/// Jikan REST provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JikanConfig {
    #[serde(default = "default_jikan_url")]
    pub base_url: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_jikan_interval")]
    pub min_interval_ms: u64,
    #[serde(default = "default_short_cooldown")]
    pub cooldown_secs: u64,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: default_jikan_url(),
            timeout_secs: default_metadata_timeout(),
            min_interval_ms: default_jikan_interval(),
            cooldown_secs: default_short_cooldown(),
        }
    }
}

fn default_jikan_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_jikan_interval() -> u64 {
    400 // 3 req/sec
}

fn default_short_cooldown() -> u64 {
    5
}

/// YouTube page fetching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YouTubeConfig {
    #[serde(default = "default_youtube_url")]
    pub base_url: String,
    #[serde(default = "default_youtube_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_youtube_interval")]
    pub min_interval_ms: u64,
    #[serde(default = "default_short_cooldown")]
    pub cooldown_secs: u64,
    /// Max distinct video ids kept per search query.
    #[serde(default = "default_search_results_limit")]
    pub search_results_limit: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: default_youtube_url(),
            timeout_secs: default_youtube_timeout(),
            min_interval_ms: default_youtube_interval(),
            cooldown_secs: default_short_cooldown(),
            search_results_limit: default_search_results_limit(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

fn default_youtube_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_youtube_timeout() -> u32 {
    20
}

fn default_youtube_interval() -> u64 {
    500
}

fn default_search_results_limit() -> usize {
    12
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}
