//! Trailer resolver implementation.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::slice;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::{ResolutionStrategy, ResolverOptions};
use super::types::{EntryOutcome, ProviderFailure, ResolutionReport};
use crate::cache::RunCache;
use crate::catalog::{Catalog, CatalogEntry};
use crate::metadata::{MalIdLookup, RawTrailer, TrailerProvider};
use crate::search::SearchFallback;
use crate::trailer::{normalize, normalize_record, TrailerCandidate, TrailerRecord};
use crate::verify::EmbeddabilityVerifier;
use crate::youtube::VideoPlatform;

/// Resolves one verified-embeddable trailer per catalog entry.
///
/// Per entry: take the primary provider's trailer, else the secondary's,
/// else nothing. A trailer that cannot be embedded is swapped for a search
/// result, or removed when no embeddable result exists. Entries that got no
/// provider trailer are never searched for.
pub struct TrailerResolver {
    primary: Arc<dyn TrailerProvider>,
    secondary: Arc<dyn TrailerProvider>,
    id_lookup: Option<Arc<dyn MalIdLookup>>,
    verifier: Arc<EmbeddabilityVerifier>,
    fallback: SearchFallback,
    options: ResolverOptions,
}

impl TrailerResolver {
    /// Create a resolver. `cache` is shared by verification and search for
    /// the lifetime of the resolver.
    pub fn new(
        primary: Arc<dyn TrailerProvider>,
        secondary: Arc<dyn TrailerProvider>,
        platform: Arc<dyn VideoPlatform>,
        cache: Arc<RunCache>,
        options: ResolverOptions,
    ) -> Self {
        let verifier = Arc::new(EmbeddabilityVerifier::new(platform.clone(), cache.clone()));
        let fallback = SearchFallback::new(platform, verifier.clone(), cache)
            .with_results_limit(options.search_results_limit);

        Self {
            primary,
            secondary,
            id_lookup: None,
            verifier,
            fallback,
            options,
        }
    }

    /// Use `lookup` to fill in missing AniList ids when enabled in options.
    pub fn with_id_lookup(mut self, lookup: Arc<dyn MalIdLookup>) -> Self {
        self.id_lookup = Some(lookup);
        self
    }

    /// Resolve trailers for the catalog in place.
    pub async fn run(&self, catalog: &mut Catalog) -> ResolutionReport {
        let end = self
            .options
            .limit
            .map_or(catalog.anime.len(), |limit| limit.min(catalog.anime.len()));
        let entries = &mut catalog.anime[..end];

        info!(
            entries = entries.len(),
            strategy = ?self.options.strategy,
            refresh = self.options.refresh,
            "Starting trailer resolution"
        );

        match self.options.strategy {
            ResolutionStrategy::TwoPass => {
                let mut report = ResolutionReport::default();
                self.process(entries, &mut report).await;
                report
            }
            ResolutionStrategy::PerEntry => {
                let mut report = ResolutionReport::default();
                for entry in entries.iter_mut() {
                    report.merge(self.resolve_entry(entry).await);
                }
                report
            }
        }
    }

    /// Acquire, verify and repair a single entry.
    pub async fn resolve_entry(&self, entry: &mut CatalogEntry) -> ResolutionReport {
        let mut report = ResolutionReport::default();
        self.process(slice::from_mut(entry), &mut report).await;
        report
    }

    async fn process(&self, entries: &mut [CatalogEntry], report: &mut ResolutionReport) {
        let needs: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.options.refresh || !entry.has_trailer())
            .map(|(idx, _)| idx)
            .collect();

        if self.options.lookup_missing_anilist_ids {
            self.lookup_anilist_ids(entries, &needs, report).await;
        }

        self.acquire(entries, &needs, report).await;

        for entry in entries.iter_mut() {
            self.settle(entry, report).await;
        }

        report.processed += entries.len();
        report.trailers_present += entries.iter().filter(|e| e.has_trailer()).count();
    }

    async fn lookup_anilist_ids(
        &self,
        entries: &mut [CatalogEntry],
        needs: &[usize],
        report: &mut ResolutionReport,
    ) {
        let Some(lookup) = &self.id_lookup else {
            return;
        };

        for &idx in needs {
            let entry = &mut entries[idx];
            if entry.anilist_id().is_some() {
                continue;
            }
            let Some(mal_id) = entry.mal_id() else {
                continue;
            };

            match lookup.anilist_id_for_mal(mal_id).await {
                Ok(Some(anilist_id)) => {
                    debug!(mal_id, anilist_id, "Found AniList id");
                    entry.set_anilist_id(anilist_id);
                    report.anilist_ids_found += 1;
                }
                Ok(None) => debug!(mal_id, "No AniList id for MyAnimeList id"),
                Err(e) => {
                    warn!(mal_id, error = %e, "AniList id lookup failed");
                    report.provider_errors.push(ProviderFailure {
                        provider: "anilist-id-lookup".to_string(),
                        ids: vec![mal_id],
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Store a provider trailer on each entry in `needs`, or null when no
    /// provider has one.
    async fn acquire(
        &self,
        entries: &mut [CatalogEntry],
        needs: &[usize],
        report: &mut ResolutionReport,
    ) {
        if needs.is_empty() {
            return;
        }

        let mut acquired: HashMap<usize, TrailerCandidate> = HashMap::new();

        let primary_ids: BTreeSet<u64> = needs
            .iter()
            .filter_map(|&idx| entries[idx].anilist_id())
            .collect();
        let trailers = self
            .fetch_from(self.primary.as_ref(), &primary_ids, report)
            .await;
        for &idx in needs {
            if let Some(candidate) = candidate_for(&trailers, entries[idx].anilist_id()) {
                acquired.insert(idx, candidate);
                report.acquired_primary += 1;
            }
        }

        let remaining: Vec<usize> = needs
            .iter()
            .copied()
            .filter(|idx| !acquired.contains_key(idx))
            .collect();
        let secondary_ids: BTreeSet<u64> = remaining
            .iter()
            .filter_map(|&idx| entries[idx].mal_id())
            .collect();
        let trailers = self
            .fetch_from(self.secondary.as_ref(), &secondary_ids, report)
            .await;
        for &idx in &remaining {
            if let Some(candidate) = candidate_for(&trailers, entries[idx].mal_id()) {
                acquired.insert(idx, candidate);
                report.acquired_secondary += 1;
            }
        }

        info!(
            primary = report.acquired_primary,
            secondary = report.acquired_secondary,
            wanted = needs.len(),
            "Acquired provider trailers"
        );

        for &idx in needs {
            let entry = &mut entries[idx];
            match acquired.remove(&idx) {
                Some(candidate) => entry.set_trailer(Some(TrailerRecord::from(&candidate))),
                // Refresh found nothing new; the stored trailer is still verified.
                None if entry.has_trailer() => {}
                None => {
                    entry.set_trailer(None);
                    report.record(EntryOutcome::NotFound, entry.display_title());
                }
            }
        }
    }

    /// Fetch trailers for `ids` in provider-sized batches.
    ///
    /// A failed batch is reported and skipped.
    async fn fetch_from(
        &self,
        provider: &dyn TrailerProvider,
        ids: &BTreeSet<u64>,
        report: &mut ResolutionReport,
    ) -> HashMap<u64, RawTrailer> {
        let mut trailers = HashMap::new();
        if ids.is_empty() {
            return trailers;
        }

        let source = provider.source();
        let ids: Vec<u64> = ids.iter().copied().collect();
        info!(source = %source, ids = ids.len(), "Fetching trailers");

        for batch in ids.chunks(provider.max_batch_size().max(1)) {
            match provider.fetch_trailers(batch).await {
                Ok(found) => trailers.extend(found),
                Err(e) => {
                    warn!(source = %source, ids = ?batch, error = %e, "Trailer fetch failed");
                    report.provider_errors.push(ProviderFailure {
                        provider: source.as_str().to_string(),
                        ids: batch.to_vec(),
                        error: e.to_string(),
                    });
                }
            }
        }

        trailers
    }

    /// Verify the entry's stored trailer and repair it when blocked.
    async fn settle(&self, entry: &mut CatalogEntry, report: &mut ResolutionReport) {
        let Some(record) = entry.stored_trailer() else {
            return;
        };

        let Some(current) = normalize_record(&record) else {
            debug!(title = entry.display_title(), "Stored trailer has no video id, clearing");
            entry.set_trailer(None);
            report.record(EntryOutcome::Cleared, entry.display_title());
            return;
        };

        if self.verifier.is_embeddable(&current.video_id).await {
            entry.set_trailer(Some(TrailerRecord::from(&current)));
            report.record(EntryOutcome::Verified, entry.display_title());
            return;
        }

        let title = entry.title().unwrap_or_default().to_string();
        let blocked = HashSet::from([current.video_id.clone()]);

        match self.fallback.find_replacement(&title, &blocked).await {
            Some(replacement) => {
                info!(
                    title = %title,
                    blocked = %current.video_id,
                    replacement = %replacement.video_id,
                    "Replaced blocked trailer"
                );
                entry.set_trailer(Some(TrailerRecord::from(&replacement)));
                report.record(EntryOutcome::Replaced, entry.display_title());
            }
            None => {
                warn!(title = entry.display_title(), blocked = %current.video_id, "Removed blocked trailer");
                entry.set_trailer(None);
                report.record(EntryOutcome::Removed, entry.display_title());
            }
        }
    }
}

fn candidate_for(trailers: &HashMap<u64, RawTrailer>, id: Option<u64>) -> Option<TrailerCandidate> {
    trailers.get(&id?).and_then(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockMalIdLookup, MockTrailerProvider, MockVideoPlatform};
    use crate::trailer::TrailerSource;
    use serde_json::Value;

    struct Harness {
        anilist: Arc<MockTrailerProvider>,
        jikan: Arc<MockTrailerProvider>,
        platform: Arc<MockVideoPlatform>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                anilist: Arc::new(MockTrailerProvider::anilist()),
                jikan: Arc::new(MockTrailerProvider::jikan()),
                platform: Arc::new(MockVideoPlatform::new()),
            }
        }

        fn resolver(&self, options: ResolverOptions) -> TrailerResolver {
            TrailerResolver::new(
                self.anilist.clone(),
                self.jikan.clone(),
                self.platform.clone(),
                Arc::new(RunCache::new()),
                options,
            )
        }
    }

    fn trailer_id(entry: &CatalogEntry) -> Option<String> {
        entry.stored_trailer().and_then(|t| t.id.clone())
    }

    #[tokio::test]
    async fn test_primary_trailer_verified() {
        let h = Harness::new();
        h.anilist
            .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
            .await;
        h.platform
            .set_watch_page("abc12345678", fixtures::embeddable_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), Some(10))]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        let trailer = catalog.anime[0].stored_trailer().unwrap();
        assert_eq!(trailer.id.as_deref(), Some("abc12345678"));
        assert_eq!(trailer.source.as_deref(), Some("anilist"));
        assert_eq!(trailer.site.as_deref(), Some("youtube"));
        assert_eq!(report.acquired_primary, 1);
        assert_eq!(report.verified, 1);
        assert_eq!(report.trailers_present, 1);
        // Secondary is not consulted
        assert!(h.jikan.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_secondary_used_when_primary_has_nothing() {
        let h = Harness::new();
        h.jikan
            .set_trailer(10, fixtures::jikan_embed_trailer("xyz98765432"))
            .await;
        h.platform
            .set_watch_page("xyz98765432", fixtures::embeddable_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), Some(10))]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        let trailer = catalog.anime[0].stored_trailer().unwrap();
        assert_eq!(trailer.id.as_deref(), Some("xyz98765432"));
        assert_eq!(trailer.source.as_deref(), Some("jikan"));
        assert_eq!(report.acquired_primary, 0);
        assert_eq!(report.acquired_secondary, 1);
    }

    #[tokio::test]
    async fn test_primary_error_falls_through_to_secondary() {
        let h = Harness::new();
        h.anilist.fail_for(1).await;
        h.jikan
            .set_trailer(10, fixtures::jikan_embed_trailer("xyz98765432"))
            .await;
        h.platform
            .set_watch_page("xyz98765432", fixtures::embeddable_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), Some(10))]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert_eq!(trailer_id(&catalog.anime[0]).as_deref(), Some("xyz98765432"));
        assert_eq!(report.provider_errors.len(), 1);
        assert_eq!(report.provider_errors[0].provider, "anilist");
        assert_eq!(report.provider_errors[0].ids, vec![1]);
    }

    #[tokio::test]
    async fn test_unusable_provider_trailer_is_ignored() {
        let h = Harness::new();
        // Not hosted on YouTube
        h.anilist
            .set_trailer(
                1,
                RawTrailer::AniList(crate::metadata::AniListTrailer {
                    id: Some("x7abc".to_string()),
                    site: Some("dailymotion".to_string()),
                    thumbnail: None,
                }),
            )
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), None)]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert_eq!(catalog.anime[0].metadata_field("trailer"), Some(&Value::Null));
        assert_eq!(report.not_found, 1);
        assert!(h.platform.search_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_trailer_removed_without_replacement() {
        let h = Harness::new();
        h.anilist
            .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
            .await;
        h.platform
            .set_watch_page("abc12345678", fixtures::blocked_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), None)]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert!(!catalog.anime[0].has_trailer());
        assert_eq!(report.removed, 1);
        assert_eq!(report.missing_titles, vec!["Frieren"]);
        assert_eq!(report.trailers_present, 0);
        assert_eq!(h.platform.search_requests().await.len(), 3);
    }

    #[tokio::test]
    async fn test_existing_trailer_skips_acquisition_but_is_verified() {
        let h = Harness::new();
        h.platform
            .set_watch_page("old00000001", fixtures::blocked_watch_page())
            .await;
        h.platform
            .set_search_page(
                "Frieren official trailer",
                fixtures::search_page_html(&["new00000002"]),
            )
            .await;
        h.platform
            .set_watch_page("new00000002", fixtures::embeddable_watch_page())
            .await;

        let mut entry = fixtures::catalog_entry("Frieren", Some(1), Some(10));
        entry.set_trailer(Some(TrailerRecord {
            url: Some("https://www.youtube.com/watch?v=old00000001".to_string()),
            ..Default::default()
        }));
        let mut catalog = fixtures::catalog(vec![entry]);

        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert!(h.anilist.recorded_calls().await.is_empty());
        assert!(h.jikan.recorded_calls().await.is_empty());
        assert_eq!(trailer_id(&catalog.anime[0]).as_deref(), Some("new00000002"));
        assert_eq!(report.replaced, 1);
    }

    #[tokio::test]
    async fn test_refresh_keeps_existing_when_providers_have_nothing() {
        let h = Harness::new();
        h.platform
            .set_watch_page("old00000001", fixtures::embeddable_watch_page())
            .await;

        let mut entry = fixtures::catalog_entry("Frieren", Some(1), None);
        entry.set_trailer(Some(TrailerRecord {
            id: Some("old00000001".to_string()),
            ..Default::default()
        }));
        let mut catalog = fixtures::catalog(vec![entry]);

        let options = ResolverOptions {
            refresh: true,
            ..Default::default()
        };
        let report = h.resolver(options).run(&mut catalog).await;

        assert_eq!(h.anilist.recorded_calls().await, vec![vec![1]]);
        assert_eq!(trailer_id(&catalog.anime[0]).as_deref(), Some("old00000001"));
        assert_eq!(report.verified, 1);
        assert_eq!(report.not_found, 0);
    }

    #[tokio::test]
    async fn test_stored_trailer_without_id_is_cleared() {
        let h = Harness::new();
        let mut entry = fixtures::catalog_entry("Frieren", None, None);
        entry.set_trailer(Some(TrailerRecord {
            url: Some("https://vimeo.com/12345".to_string()),
            ..Default::default()
        }));
        let mut catalog = fixtures::catalog(vec![entry]);

        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert_eq!(report.cleared, 1);
        assert!(!catalog.anime[0].has_trailer());
        assert_eq!(h.platform.total_watch_requests().await, 0);
    }

    #[tokio::test]
    async fn test_limit_restricts_entries() {
        let h = Harness::new();
        let mut catalog = fixtures::catalog(vec![
            fixtures::catalog_entry("A", Some(1), None),
            fixtures::catalog_entry("B", Some(2), None),
            fixtures::catalog_entry("C", Some(3), None),
        ]);

        let options = ResolverOptions {
            limit: Some(2),
            ..Default::default()
        };
        let report = h.resolver(options).run(&mut catalog).await;

        assert_eq!(report.processed, 2);
        assert_eq!(h.anilist.recorded_calls().await, vec![vec![1, 2]]);
        assert_eq!(catalog.anime[2].metadata_field("trailer"), None);
    }

    #[tokio::test]
    async fn test_two_pass_batches_and_dedups_primary_ids() {
        let h = Harness::new();
        h.anilist.set_batch_size(2).await;
        let mut catalog = fixtures::catalog(vec![
            fixtures::catalog_entry("A", Some(3), None),
            fixtures::catalog_entry("B", Some(1), None),
            fixtures::catalog_entry("B again", Some(1), None),
            fixtures::catalog_entry("C", Some(2), None),
        ]);

        h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert_eq!(h.anilist.recorded_calls().await, vec![vec![1, 2], vec![3]]);
    }

    #[tokio::test]
    async fn test_anilist_id_lookup() {
        let h = Harness::new();
        let lookup = Arc::new(MockMalIdLookup::new());
        lookup.set_mapping(10, 1).await;
        h.anilist
            .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
            .await;
        h.platform
            .set_watch_page("abc12345678", fixtures::embeddable_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", None, Some(10))]);
        let options = ResolverOptions {
            lookup_missing_anilist_ids: true,
            ..Default::default()
        };
        let report = h
            .resolver(options)
            .with_id_lookup(lookup)
            .run(&mut catalog)
            .await;

        assert_eq!(catalog.anime[0].anilist_id(), Some(1));
        assert_eq!(report.anilist_ids_found, 1);
        assert_eq!(report.acquired_primary, 1);
    }

    #[tokio::test]
    async fn test_anilist_id_lookup_disabled_by_default() {
        let h = Harness::new();
        let lookup = Arc::new(MockMalIdLookup::new());
        lookup.set_mapping(10, 1).await;

        let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", None, Some(10))]);
        h.resolver(ResolverOptions::default())
            .with_id_lookup(lookup.clone())
            .run(&mut catalog)
            .await;

        assert_eq!(catalog.anime[0].anilist_id(), None);
        assert_eq!(lookup.lookup_count().await, 0);
    }

    #[tokio::test]
    async fn test_secondary_item_error_is_isolated() {
        let h = Harness::new();
        h.jikan.fail_for(10).await;
        h.jikan
            .set_trailer(20, fixtures::jikan_embed_trailer("xyz98765432"))
            .await;
        h.platform
            .set_watch_page("xyz98765432", fixtures::embeddable_watch_page())
            .await;

        let mut catalog = fixtures::catalog(vec![
            fixtures::catalog_entry("A", None, Some(10)),
            fixtures::catalog_entry("B", None, Some(20)),
        ]);
        let report = h.resolver(ResolverOptions::default()).run(&mut catalog).await;

        assert!(!catalog.anime[0].has_trailer());
        assert_eq!(trailer_id(&catalog.anime[1]).as_deref(), Some("xyz98765432"));
        assert_eq!(report.provider_errors.len(), 1);
        assert_eq!(report.provider_errors[0].provider, TrailerSource::Jikan.as_str());
        assert_eq!(report.provider_errors[0].ids, vec![10]);
    }
}
