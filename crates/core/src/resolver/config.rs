//! Resolver configuration.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::search::DEFAULT_RESULTS_LIMIT;

/// How acquisition is batched across catalog entries.
///
/// Both strategies leave every entry in the same final state for the same
/// upstream responses; they differ only in request batching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Acquire for all entries first (batched), then verify and repair all.
    #[default]
    TwoPass,
    /// Acquire, verify and repair one entry at a time.
    PerEntry,
}

/// Options for one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub strategy: ResolutionStrategy,
    /// Re-acquire trailers for entries that already have one.
    pub refresh: bool,
    /// Only process the first N entries.
    pub limit: Option<usize>,
    /// Fill in missing AniList ids from MyAnimeList ids before acquiring.
    pub lookup_missing_anilist_ids: bool,
    /// Candidate ids taken from each search page.
    pub search_results_limit: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            strategy: ResolutionStrategy::default(),
            refresh: false,
            limit: None,
            lookup_missing_anilist_ids: false,
            search_results_limit: DEFAULT_RESULTS_LIMIT,
        }
    }
}

impl From<&Config> for ResolverOptions {
    fn from(config: &Config) -> Self {
        Self {
            strategy: config.run.strategy,
            refresh: config.run.refresh,
            limit: config.run.limit,
            lookup_missing_anilist_ids: config.run.lookup_missing_anilist_ids,
            search_results_limit: config.youtube.search_results_limit,
        }
    }
}
