pub mod cache;
pub mod catalog;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod resolver;
pub mod search;
pub mod testing;
pub mod trailer;
pub mod upstream;
pub mod verify;
pub mod youtube;

pub use cache::{RunCache, RunCacheStats};
pub use catalog::{load_catalog, save_catalog, Catalog, CatalogEntry, CatalogError};
pub use config::{
    load_config, load_config_from_str, validate_config, AniListConfig, CatalogConfig, Config,
    ConfigError, JikanConfig, RunConfig, YouTubeConfig,
};
pub use metadata::{
    AniListClient, JikanClient, MalIdLookup, MetadataError, RawTrailer, TrailerProvider,
};
pub use resolver::{
    EntryOutcome, ProviderFailure, ResolutionReport, ResolutionStrategy, ResolverOptions,
    TrailerResolver,
};
pub use search::{fallback_queries, SearchFallback};
pub use trailer::{normalize, TrailerCandidate, TrailerRecord, TrailerSource};
pub use upstream::{RateLimiter, Upstream, UpstreamPolicy};
pub use verify::{EmbedVerdict, EmbeddabilityVerifier};
pub use youtube::{extract_embedded_json, PlatformError, VideoPlatform, YouTubeClient};
