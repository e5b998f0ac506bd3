use super::{types::Config, ConfigError};

/// Largest page AniList serves for an `id_in` query.
const ANILIST_MAX_BATCH: usize = 50;

/// Validate configuration
/// Currently validates:
/// - Catalog input path is not empty
/// - AniList batch size is within 1..=50
/// - Search results limit is not 0
/// - Run limit is not 0
/// - Upstream base URLs are not blank
/// - Upstream timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.input.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.input cannot be empty".to_string(),
        ));
    }

    if config.anilist.batch_size == 0 || config.anilist.batch_size > ANILIST_MAX_BATCH {
        return Err(ConfigError::ValidationError(format!(
            "anilist.batch_size must be between 1 and {}",
            ANILIST_MAX_BATCH
        )));
    }

    if config.youtube.search_results_limit == 0 {
        return Err(ConfigError::ValidationError(
            "youtube.search_results_limit cannot be 0".to_string(),
        ));
    }

    if config.run.limit == Some(0) {
        return Err(ConfigError::ValidationError(
            "run.limit cannot be 0 (omit it to process every entry)".to_string(),
        ));
    }

    for (name, url) in [
        ("anilist.base_url", &config.anilist.base_url),
        ("jikan.base_url", &config.jikan.base_url),
        ("youtube.base_url", &config.youtube.base_url),
    ] {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    for (name, timeout) in [
        ("anilist.timeout_secs", config.anilist.timeout_secs),
        ("jikan.timeout_secs", config.jikan.timeout_secs),
        ("youtube.timeout_secs", config.youtube.timeout_secs),
    ] {
        if timeout == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                name
            )));
        }
    }

    Ok(())
}
