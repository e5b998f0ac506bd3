//! Anime catalog document - the JSON file whose trailers are maintained.

mod types;

pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur reading or writing the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog: Catalog =
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), entries = catalog.anime.len(), "Loaded catalog");
    Ok(catalog)
}

/// Write a catalog as indented JSON with a trailing newline.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let mut content = serde_json::to_string_pretty(catalog)?;
    content.push('\n');

    fs::write(path, content).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Wrote catalog");
    Ok(())
}
