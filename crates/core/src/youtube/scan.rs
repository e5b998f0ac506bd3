//! Video id extraction from search result pages.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashSet;

/// `"videoId":"<11 chars>"` as it appears in the page's initial data.
static VIDEO_ID_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":"([a-zA-Z0-9_-]{11})""#).unwrap());

/// Scan a search page body for video ids.
///
/// Ids are returned in first-seen order without duplicates, at most `limit`.
pub fn scan_video_ids(body: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for caps in VIDEO_ID_FIELD.captures_iter(body) {
        if ids.len() >= limit {
            break;
        }
        let Some(id) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if seen.insert(id) {
            ids.push(id.to_string());
        }
    }

    ids
}
