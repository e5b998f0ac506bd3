mod metrics;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anitrail_core::{
    load_catalog, load_config, save_catalog, validate_config, AniListClient, JikanClient,
    RateLimiter, ResolverOptions, RunCache, TrailerResolver, YouTubeClient,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ANITRAIL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Catalog input: {:?}", config.catalog.input);
    info!("Strategy: {:?}", config.run.strategy);

    let limiter = Arc::new(RateLimiter::from_config(&config));
    let anilist = Arc::new(
        AniListClient::new(&config.anilist, limiter.clone())
            .context("Failed to create AniList client")?,
    );
    let jikan = Arc::new(
        JikanClient::new(&config.jikan, limiter.clone()).context("Failed to create Jikan client")?,
    );
    let youtube = Arc::new(
        YouTubeClient::new(&config.youtube, limiter.clone())
            .context("Failed to create YouTube client")?,
    );

    let mut catalog = load_catalog(&config.catalog.input).context("Failed to load catalog")?;

    let cache = Arc::new(RunCache::new());
    let resolver = TrailerResolver::new(
        anilist.clone(),
        jikan,
        youtube,
        cache.clone(),
        ResolverOptions::from(&config),
    )
    .with_id_lookup(anilist);

    let report = resolver.run(&mut catalog).await;

    let output = config.catalog.output_path();
    save_catalog(output, &catalog)
        .with_context(|| format!("Failed to write catalog to {:?}", output))?;

    info!(
        "Total trailers present: {} / {}",
        report.trailers_present, report.processed
    );
    info!(
        "Acquired: {} primary, {} secondary",
        report.acquired_primary, report.acquired_secondary
    );
    info!("Verified trailers: {}", report.verified);
    info!("Replaced blocked trailers: {}", report.replaced);
    info!(
        "Removed blocked trailers (no embeddable alternative found): {}",
        report.removed
    );
    info!("Entries without any provider trailer: {}", report.not_found);
    if report.cleared > 0 {
        info!("Cleared unusable stored trailers: {}", report.cleared);
    }
    for failure in &report.provider_errors {
        warn!(
            "Provider {} failed for {:?}: {}",
            failure.provider, failure.ids, failure.error
        );
    }
    if !report.missing_titles.is_empty() {
        info!("Missing embeddable trailers:");
        for title in &report.missing_titles {
            info!("  - {}", title);
        }
    }

    let stats = cache.stats().await;
    debug!(
        verdicts = stats.verdicts,
        searches = stats.searches,
        "Run cache size"
    );
    match serde_json::to_string(&report) {
        Ok(json) => debug!("Report: {}", json),
        Err(e) => warn!("Failed to serialize report: {}", e),
    }
    debug!("Metrics:\n{}", metrics::encode_metrics());

    info!("Updated file written to {:?}", output);
    Ok(())
}
