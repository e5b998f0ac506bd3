//! Testing utilities and mock implementations for resolver tests.
//!
//! This module provides mock implementations of the upstream traits so the
//! whole resolution pipeline can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use anitrail_core::testing::{fixtures, MockTrailerProvider, MockVideoPlatform};
//!
//! let anilist = MockTrailerProvider::anilist();
//! let platform = MockVideoPlatform::new();
//!
//! // Configure mock responses
//! anilist.set_trailer(154587, fixtures::anilist_trailer("abc12345678")).await;
//! platform.set_watch_page("abc12345678", fixtures::embeddable_watch_page()).await;
//!
//! // Build a TrailerResolver from them...
//! ```

mod mock_trailer_provider;
mod mock_video_platform;

pub use mock_trailer_provider::{MockMalIdLookup, MockTrailerProvider};
pub use mock_video_platform::MockVideoPlatform;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{Map, Value};

    use crate::catalog::{Catalog, CatalogEntry};
    use crate::metadata::{AniListTrailer, JikanTrailer, RawTrailer};
    use crate::youtube::PLAYER_RESPONSE_MARKER;

    /// A watch page with the given playability status.
    ///
    /// The player response includes strings with braces and escaped quotes,
    /// and more script follows it on the same line, like real pages.
    pub fn watch_page_html(status: &str, playable_in_embed: Option<bool>) -> String {
        let embed = match playable_in_embed {
            Some(flag) => format!(",\"playableInEmbed\":{}", flag),
            None => String::new(),
        };
        format!(
            concat!(
                "<!DOCTYPE html><html><head><title>Trailer - YouTube</title></head><body>",
                "<script nonce=\"x\">var {marker}{{\"responseContext\":{{\"serviceTrackingParams\":[]}},",
                "\"playabilityStatus\":{{\"status\":\"{status}\"{embed},",
                "\"contextParams\":\"Q0FBU0FnZ0E=\"}},",
                "\"videoDetails\":{{\"title\":\"PV \\\"{{1}}\\\" [Main]\",",
                "\"shortDescription\":\"}}}} not the end\"}}}};",
                "var meta = document.createElement('meta');</script></body></html>"
            ),
            marker = PLAYER_RESPONSE_MARKER,
            status = status,
            embed = embed,
        )
    }

    /// `OK` with no embed flag.
    pub fn embeddable_watch_page() -> String {
        watch_page_html("OK", None)
    }

    /// `OK` but `playableInEmbed: false`.
    pub fn blocked_watch_page() -> String {
        watch_page_html("OK", Some(false))
    }

    /// Age-gated video.
    pub fn login_required_watch_page() -> String {
        watch_page_html("LOGIN_REQUIRED", Some(true))
    }

    /// A search results page listing `video_ids` in order, each appearing
    /// twice as real result renderers do.
    pub fn search_page_html(video_ids: &[&str]) -> String {
        let renderers: Vec<String> = video_ids
            .iter()
            .map(|id| {
                format!(
                    "{{\"videoRenderer\":{{\"videoId\":\"{id}\",\"navigationEndpoint\":{{\"watchEndpoint\":{{\"videoId\":\"{id}\"}}}}}}}}",
                    id = id
                )
            })
            .collect();
        format!(
            "<html><script>var ytInitialData = {{\"contents\":[{}]}};</script></html>",
            renderers.join(",")
        )
    }

    /// AniList trailer hosted on YouTube.
    pub fn anilist_trailer(video_id: &str) -> RawTrailer {
        RawTrailer::AniList(AniListTrailer {
            id: Some(video_id.to_string()),
            site: Some("youtube".to_string()),
            thumbnail: Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)),
        })
    }

    /// Jikan trailer exposing the id only through its embed URL.
    pub fn jikan_embed_trailer(video_id: &str) -> RawTrailer {
        RawTrailer::Jikan(JikanTrailer {
            youtube_id: None,
            url: None,
            embed_url: Some(format!(
                "https://www.youtube-nocookie.com/embed/{}?enablejsapi=1&wmode=opaque&autoplay=1",
                video_id
            )),
        })
    }

    /// A catalog entry with the ids the providers are queried by.
    pub fn catalog_entry(title: &str, anilist_id: Option<u64>, mal_id: Option<u64>) -> CatalogEntry {
        let mut metadata = Map::new();
        if let Some(id) = anilist_id {
            metadata.insert("anilistId".to_string(), Value::from(id));
        }
        if let Some(id) = mal_id {
            metadata.insert("malId".to_string(), Value::from(id));
        }
        metadata.insert("title".to_string(), Value::from(title));

        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::from(title));
        fields.insert("metadata".to_string(), Value::Object(metadata));
        CatalogEntry::from(fields)
    }

    pub fn catalog(entries: Vec<CatalogEntry>) -> Catalog {
        Catalog::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use crate::verify::{verdict_from_page, EmbedVerdict};
    use crate::youtube::scan_video_ids;

    #[test]
    fn test_watch_page_fixtures_parse() {
        assert_eq!(
            verdict_from_page(&fixtures::embeddable_watch_page()).unwrap(),
            EmbedVerdict::Embeddable
        );
        assert_eq!(
            verdict_from_page(&fixtures::blocked_watch_page()).unwrap(),
            EmbedVerdict::NotEmbeddable
        );
        assert_eq!(
            verdict_from_page(&fixtures::login_required_watch_page()).unwrap(),
            EmbedVerdict::NotEmbeddable
        );
    }

    #[test]
    fn test_search_page_fixture_scans() {
        let body = fixtures::search_page_html(&["abc12345678", "xyz98765432"]);
        assert_eq!(scan_video_ids(&body, 12), vec!["abc12345678", "xyz98765432"]);
    }
}
