//! Resolution lifecycle integration tests.
//!
//! These tests drive complete catalogs through the resolver with mock
//! upstreams: acquire -> verify -> repair -> write back.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use anitrail_core::{
    load_catalog, save_catalog,
    testing::{fixtures, MockTrailerProvider, MockVideoPlatform},
    Catalog, ResolutionReport, ResolutionStrategy, ResolverOptions, RunCache, TrailerResolver,
};

/// Test helper holding the mock upstreams.
struct TestHarness {
    anilist: Arc<MockTrailerProvider>,
    jikan: Arc<MockTrailerProvider>,
    platform: Arc<MockVideoPlatform>,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            anilist: Arc::new(MockTrailerProvider::anilist()),
            jikan: Arc::new(MockTrailerProvider::jikan()),
            platform: Arc::new(MockVideoPlatform::new()),
        }
    }

    fn create_resolver(&self, strategy: ResolutionStrategy) -> TrailerResolver {
        TrailerResolver::new(
            self.anilist.clone(),
            self.jikan.clone(),
            self.platform.clone(),
            Arc::new(RunCache::new()),
            ResolverOptions {
                strategy,
                ..Default::default()
            },
        )
    }

    async fn run(&self, strategy: ResolutionStrategy, catalog: &mut Catalog) -> ResolutionReport {
        self.create_resolver(strategy).run(catalog).await
    }
}

/// Upstream responses shared by the strategy comparison tests.
async fn seed_mixed_upstreams(h: &TestHarness) {
    // 1: embeddable AniList trailer
    h.anilist
        .set_trailer(1, fixtures::anilist_trailer("aaa00000001"))
        .await;
    h.platform
        .set_watch_page("aaa00000001", fixtures::embeddable_watch_page())
        .await;

    // 2: blocked AniList trailer, replaced through search
    h.anilist
        .set_trailer(2, fixtures::anilist_trailer("bbb00000002"))
        .await;
    h.platform
        .set_watch_page("bbb00000002", fixtures::blocked_watch_page())
        .await;
    h.platform
        .set_search_page(
            "Dungeon Meshi official trailer",
            fixtures::search_page_html(&["bbb00000002", "rep00000002"]),
        )
        .await;
    h.platform
        .set_watch_page("rep00000002", fixtures::embeddable_watch_page())
        .await;

    // 3: nothing on AniList, Jikan trailer via embed URL
    h.jikan
        .set_trailer(30, fixtures::jikan_embed_trailer("ccc00000003"))
        .await;
    h.platform
        .set_watch_page("ccc00000003", fixtures::embeddable_watch_page())
        .await;

    // 4: login-required Jikan trailer without any replacement
    h.jikan
        .set_trailer(40, fixtures::jikan_embed_trailer("ddd00000004"))
        .await;
    h.platform
        .set_watch_page("ddd00000004", fixtures::login_required_watch_page())
        .await;

    // 5: no provider data at all
}

fn mixed_catalog() -> Catalog {
    fixtures::catalog(vec![
        fixtures::catalog_entry("Frieren", Some(1), Some(10)),
        fixtures::catalog_entry("Dungeon Meshi", Some(2), Some(20)),
        fixtures::catalog_entry("Apothecary Diaries", Some(3), Some(30)),
        fixtures::catalog_entry("Oshi no Ko", None, Some(40)),
        fixtures::catalog_entry("Unknown Pilot", Some(5), Some(50)),
    ])
}

#[tokio::test]
async fn test_blocked_provider_trailer_replaced_by_search_result() {
    let h = TestHarness::new();
    h.anilist
        .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
        .await;
    h.platform
        .set_watch_page("abc12345678", fixtures::blocked_watch_page())
        .await;
    h.platform
        .set_search_page(
            "Frieren official trailer",
            fixtures::search_page_html(&["abc12345678", "xyz98765432"]),
        )
        .await;
    h.platform
        .set_watch_page("xyz98765432", fixtures::embeddable_watch_page())
        .await;

    let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), None)]);
    let report = h.run(ResolutionStrategy::TwoPass, &mut catalog).await;

    let trailer = catalog.anime[0].stored_trailer().unwrap();
    assert_eq!(trailer.id.as_deref(), Some("xyz98765432"));
    assert_eq!(trailer.source.as_deref(), Some("search-fallback"));
    assert_eq!(
        trailer.url.as_deref(),
        Some("https://www.youtube.com/watch?v=xyz98765432")
    );
    assert_eq!(
        trailer.embed_url.as_deref(),
        Some("https://www.youtube.com/embed/xyz98765432")
    );
    assert_eq!(
        trailer.thumbnail.as_deref(),
        Some("https://i.ytimg.com/vi/xyz98765432/hqdefault.jpg")
    );
    assert_eq!(report.replaced, 1);

    // The blocked id was verified once and never re-checked from search results
    assert_eq!(h.platform.watch_request_count("abc12345678").await, 1);
    assert_eq!(
        h.platform.search_requests().await,
        vec!["Frieren official trailer"]
    );
}

#[tokio::test]
async fn test_no_provider_data_resolves_to_null_without_search() {
    let h = TestHarness::new();

    let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), Some(10))]);
    let report = h.run(ResolutionStrategy::TwoPass, &mut catalog).await;

    let value = serde_json::to_value(&catalog).unwrap();
    assert_eq!(value["anime"][0]["metadata"]["trailer"], json!(null));
    assert_eq!(report.not_found, 1);
    assert_eq!(h.anilist.recorded_calls().await, vec![vec![1]]);
    assert_eq!(h.jikan.recorded_calls().await, vec![vec![10]]);
    assert!(h.platform.search_requests().await.is_empty());
    assert_eq!(h.platform.total_watch_requests().await, 0);
}

#[tokio::test]
async fn test_mixed_catalog_outcomes() {
    let h = TestHarness::new();
    seed_mixed_upstreams(&h).await;

    let mut catalog = mixed_catalog();
    let report = h.run(ResolutionStrategy::TwoPass, &mut catalog).await;

    let ids: Vec<Option<String>> = catalog
        .anime
        .iter()
        .map(|e| e.stored_trailer().and_then(|t| t.id.clone()))
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("aaa00000001".to_string()),
            Some("rep00000002".to_string()),
            Some("ccc00000003".to_string()),
            None,
            None,
        ]
    );

    assert_eq!(report.processed, 5);
    assert_eq!(report.acquired_primary, 2);
    assert_eq!(report.acquired_secondary, 2);
    assert_eq!(report.verified, 2);
    assert_eq!(report.replaced, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.trailers_present, 3);
    assert_eq!(report.missing_titles, vec!["Oshi no Ko"]);
    assert!(report.provider_errors.is_empty());

    // Jikan trailer keeps its provider embed URL
    let jikan_trailer = catalog.anime[2].stored_trailer().unwrap();
    assert_eq!(jikan_trailer.source.as_deref(), Some("jikan"));
    assert!(jikan_trailer
        .embed_url
        .as_deref()
        .unwrap()
        .starts_with("https://www.youtube-nocookie.com/embed/ccc00000003"));
}

#[tokio::test]
async fn test_per_entry_and_two_pass_produce_identical_catalogs() {
    let two_pass = TestHarness::new();
    seed_mixed_upstreams(&two_pass).await;
    let mut two_pass_catalog = mixed_catalog();
    let two_pass_report = two_pass
        .run(ResolutionStrategy::TwoPass, &mut two_pass_catalog)
        .await;

    let per_entry = TestHarness::new();
    seed_mixed_upstreams(&per_entry).await;
    let mut per_entry_catalog = mixed_catalog();
    let per_entry_report = per_entry
        .run(ResolutionStrategy::PerEntry, &mut per_entry_catalog)
        .await;

    assert_eq!(two_pass_catalog, per_entry_catalog);
    assert_eq!(two_pass_report, per_entry_report);

    // Only the batching differs
    assert_eq!(
        two_pass.anilist.recorded_calls().await,
        vec![vec![1, 2, 3, 5]]
    );
    assert_eq!(
        per_entry.anilist.recorded_calls().await,
        vec![vec![1], vec![2], vec![3], vec![5]]
    );
}

#[tokio::test]
async fn test_shared_video_is_verified_once_per_run() {
    let h = TestHarness::new();
    h.anilist
        .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
        .await;
    h.anilist
        .set_trailer(2, fixtures::anilist_trailer("abc12345678"))
        .await;
    h.platform
        .set_watch_page("abc12345678", fixtures::embeddable_watch_page())
        .await;

    let mut catalog = fixtures::catalog(vec![
        fixtures::catalog_entry("Season 1", Some(1), None),
        fixtures::catalog_entry("Season 1 Recap", Some(2), None),
    ]);
    let report = h.run(ResolutionStrategy::PerEntry, &mut catalog).await;

    assert_eq!(report.verified, 2);
    assert_eq!(h.platform.watch_request_count("abc12345678").await, 1);
}

#[tokio::test]
async fn test_watch_page_failure_is_not_embeddable() {
    let h = TestHarness::new();
    h.anilist
        .set_trailer(1, fixtures::anilist_trailer("abc12345678"))
        .await;
    h.platform.fail_watch_page("abc12345678", 503).await;

    let mut catalog = fixtures::catalog(vec![fixtures::catalog_entry("Frieren", Some(1), None)]);
    let report = h.run(ResolutionStrategy::TwoPass, &mut catalog).await;

    assert_eq!(report.removed, 1);
    assert!(!catalog.anime[0].has_trailer());
}

#[tokio::test]
async fn test_catalog_file_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("anime.json");
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&json!({
            "version": 3,
            "anime": [
                {
                    "title": "Sousou no Frieren",
                    "mal_id": 52991,
                    "score": 9.3,
                    "metadata": {
                        "anilistId": 154587,
                        "title": "Frieren",
                        "genres": ["Adventure", "Drama"]
                    }
                },
                {
                    "title": "Already Done",
                    "metadata": {
                        "trailer": {
                            "site": "youtube",
                            "id": "keep0000001",
                            "url": "https://www.youtube.com/watch?v=keep0000001",
                            "embedUrl": "https://www.youtube.com/embed/keep0000001",
                            "thumbnail": "https://i.ytimg.com/vi/keep0000001/hqdefault.jpg",
                            "source": "youtube-search"
                        }
                    }
                }
            ]
        }))
        .unwrap(),
    )
    .unwrap();

    let h = TestHarness::new();
    h.anilist
        .set_trailer(154587, fixtures::anilist_trailer("abc12345678"))
        .await;
    h.platform
        .set_watch_page("abc12345678", fixtures::embeddable_watch_page())
        .await;
    h.platform
        .set_watch_page("keep0000001", fixtures::embeddable_watch_page())
        .await;

    let mut catalog = load_catalog(&path).unwrap();
    let report = h.run(ResolutionStrategy::TwoPass, &mut catalog).await;
    save_catalog(&path, &catalog).unwrap();

    assert_eq!(report.verified, 2);
    // Entry with a trailer is not sent to providers
    assert_eq!(h.anilist.recorded_calls().await, vec![vec![154587]]);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["version"], 3);
    assert_eq!(written["anime"][0]["score"], 9.3);
    assert_eq!(written["anime"][0]["mal_id"], 52991);
    assert_eq!(
        written["anime"][0]["metadata"]["genres"],
        json!(["Adventure", "Drama"])
    );
    assert_eq!(
        written["anime"][0]["metadata"]["trailer"],
        json!({
            "site": "youtube",
            "id": "abc12345678",
            "url": "https://www.youtube.com/watch?v=abc12345678",
            "embedUrl": "https://www.youtube.com/embed/abc12345678",
            "thumbnail": "https://i.ytimg.com/vi/abc12345678/hqdefault.jpg",
            "source": "anilist"
        })
    );
    // Legacy source label is rewritten in canonical form
    assert_eq!(
        written["anime"][1]["metadata"]["trailer"]["source"],
        "search-fallback"
    );
}
