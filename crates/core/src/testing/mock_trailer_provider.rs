//! Mock metadata providers for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{MalIdLookup, MetadataError, RawTrailer, TrailerProvider};
use crate::trailer::TrailerSource;

/// Mock implementation of the TrailerProvider trait.
///
/// Every `fetch_trailers` call is recorded with its id batch. A batch that
/// contains an id marked with [`fail_for`](Self::fail_for) fails as a whole,
/// like a real provider error would.
#[derive(Debug)]
pub struct MockTrailerProvider {
    source: TrailerSource,
    batch_size: AtomicUsize,
    trailers: Arc<RwLock<HashMap<u64, RawTrailer>>>,
    failing_ids: Arc<RwLock<HashSet<u64>>>,
    calls: Arc<RwLock<Vec<Vec<u64>>>>,
}

impl MockTrailerProvider {
    pub fn new(source: TrailerSource, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: AtomicUsize::new(batch_size),
            trailers: Arc::new(RwLock::new(HashMap::new())),
            failing_ids: Arc::new(RwLock::new(HashSet::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A batched provider shaped like AniList.
    pub fn anilist() -> Self {
        Self::new(TrailerSource::Anilist, 50)
    }

    /// A single-id provider shaped like Jikan.
    pub fn jikan() -> Self {
        Self::new(TrailerSource::Jikan, 1)
    }

    pub async fn set_trailer(&self, id: u64, trailer: RawTrailer) {
        self.trailers.write().await.insert(id, trailer);
    }

    pub async fn set_batch_size(&self, batch_size: usize) {
        self.batch_size.store(batch_size, Ordering::SeqCst);
    }

    /// Fail any batch that contains `id`.
    pub async fn fail_for(&self, id: u64) {
        self.failing_ids.write().await.insert(id);
    }

    /// Id batches passed to `fetch_trailers`, in call order.
    pub async fn recorded_calls(&self) -> Vec<Vec<u64>> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl TrailerProvider for MockTrailerProvider {
    fn source(&self) -> TrailerSource {
        self.source
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size.load(Ordering::SeqCst)
    }

    async fn fetch_trailers(
        &self,
        ids: &[u64],
    ) -> Result<HashMap<u64, RawTrailer>, MetadataError> {
        self.calls.write().await.push(ids.to_vec());

        let failing = self.failing_ids.read().await;
        if ids.iter().any(|id| failing.contains(id)) {
            return Err(MetadataError::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        let trailers = self.trailers.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| trailers.get(id).map(|t| (*id, t.clone())))
            .collect())
    }
}

/// Mock implementation of the MalIdLookup trait.
#[derive(Debug, Default)]
pub struct MockMalIdLookup {
    mappings: Arc<RwLock<HashMap<u64, u64>>>,
    failing_ids: Arc<RwLock<HashSet<u64>>>,
    lookups: Arc<RwLock<Vec<u64>>>,
}

impl MockMalIdLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_mapping(&self, mal_id: u64, anilist_id: u64) {
        self.mappings.write().await.insert(mal_id, anilist_id);
    }

    pub async fn fail_for(&self, mal_id: u64) {
        self.failing_ids.write().await.insert(mal_id);
    }

    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }
}

#[async_trait]
impl MalIdLookup for MockMalIdLookup {
    async fn anilist_id_for_mal(&self, mal_id: u64) -> Result<Option<u64>, MetadataError> {
        self.lookups.write().await.push(mal_id);

        if self.failing_ids.read().await.contains(&mal_id) {
            return Err(MetadataError::GraphQl("mock failure".to_string()));
        }
        Ok(self.mappings.read().await.get(&mal_id).copied())
    }
}
