//! Per-run caches shared by the verifier and the search fallback.
//!
//! A [`RunCache`] lives exactly as long as one resolution run. Nothing in it
//! is ever invalidated: a video judged not embeddable stays that way until
//! the next run, even when the judgement came from a transient failure.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::verify::EmbedVerdict;

/// Verdicts by video id and search results by query string.
#[derive(Debug, Default)]
pub struct RunCache {
    verdicts: Mutex<HashMap<String, Arc<OnceCell<EmbedVerdict>>>>,
    searches: Mutex<HashMap<String, Vec<String>>>,
}

/// Number of cached items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCacheStats {
    pub verdicts: usize,
    pub searches: usize,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The verdict slot for a video id, created empty on first access.
    ///
    /// All callers asking for the same id get the same slot, so whoever
    /// initialises it first does the fetch and everybody else waits for it.
    pub async fn verdict_slot(&self, video_id: &str) -> Arc<OnceCell<EmbedVerdict>> {
        let mut verdicts = self.verdicts.lock().await;
        verdicts
            .entry(video_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Candidate ids previously extracted for a query.
    pub async fn search_results(&self, query: &str) -> Option<Vec<String>> {
        self.searches.lock().await.get(query).cloned()
    }

    pub async fn store_search_results(&self, query: &str, ids: Vec<String>) {
        self.searches.lock().await.insert(query.to_string(), ids);
    }

    pub async fn stats(&self) -> RunCacheStats {
        let verdicts = self
            .verdicts
            .lock()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count();
        let searches = self.searches.lock().await.len();
        RunCacheStats { verdicts, searches }
    }
}
