//! Conversion of provider trailer payloads into [`TrailerCandidate`]s.
//!
//! Every function here is pure: no I/O, no clock.

use url::Url;

use super::types::{
    embed_url, thumbnail_url, watch_url, TrailerCandidate, TrailerRecord, TrailerSource,
    VIDEO_SITE,
};
use crate::metadata::{AniListTrailer, JikanTrailer, RawTrailer};

/// Normalize a raw provider trailer.
///
/// Returns `None` when the payload has no resolvable video id.
pub fn normalize(raw: &RawTrailer) -> Option<TrailerCandidate> {
    match raw {
        RawTrailer::AniList(trailer) => normalize_anilist(trailer),
        RawTrailer::Jikan(trailer) => normalize_jikan(trailer),
    }
}

/// AniList trailers are only usable when hosted on YouTube.
pub fn normalize_anilist(trailer: &AniListTrailer) -> Option<TrailerCandidate> {
    let site = trailer.site.as_deref().unwrap_or_default();
    if !site.eq_ignore_ascii_case(VIDEO_SITE) {
        return None;
    }
    let video_id = non_empty(trailer.id.as_deref())?;

    Some(TrailerCandidate {
        url: watch_url(video_id),
        embed_url: embed_url(video_id),
        thumbnail: non_empty(trailer.thumbnail.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| thumbnail_url(video_id)),
        video_id: video_id.to_string(),
        source: TrailerSource::Anilist,
    })
}

/// Jikan exposes the id directly or only through its embed/watch URLs.
pub fn normalize_jikan(trailer: &JikanTrailer) -> Option<TrailerCandidate> {
    let url = non_empty(trailer.url.as_deref());
    let embed = non_empty(trailer.embed_url.as_deref());

    let video_id = non_empty(trailer.youtube_id.as_deref())
        .map(str::to_string)
        .or_else(|| embed.and_then(extract_video_id))
        .or_else(|| url.and_then(extract_video_id))?;

    Some(TrailerCandidate {
        url: url.map(str::to_string).unwrap_or_else(|| watch_url(&video_id)),
        embed_url: embed
            .map(str::to_string)
            .unwrap_or_else(|| embed_url(&video_id)),
        thumbnail: thumbnail_url(&video_id),
        video_id,
        source: TrailerSource::Jikan,
    })
}

/// Normalize a trailer already stored in the catalog.
///
/// Supplied URLs are kept; missing ones are derived from the id. Applying
/// this to the record of a canonical candidate returns that candidate.
pub fn normalize_record(record: &TrailerRecord) -> Option<TrailerCandidate> {
    if let Some(site) = non_empty(record.site.as_deref()) {
        if !site.eq_ignore_ascii_case(VIDEO_SITE) {
            return None;
        }
    }

    let url = non_empty(record.url.as_deref());
    let embed = non_empty(record.embed_url.as_deref());

    let video_id = non_empty(record.id.as_deref())
        .map(str::to_string)
        .or_else(|| url.and_then(extract_video_id))
        .or_else(|| embed.and_then(extract_video_id))?;

    Some(TrailerCandidate {
        url: url.map(str::to_string).unwrap_or_else(|| watch_url(&video_id)),
        embed_url: embed
            .map(str::to_string)
            .unwrap_or_else(|| embed_url(&video_id)),
        thumbnail: non_empty(record.thumbnail.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| thumbnail_url(&video_id)),
        source: record
            .source
            .as_deref()
            .map(TrailerSource::from_label)
            .unwrap_or(TrailerSource::Catalog),
        video_id,
    })
}

/// Extract a YouTube video id from a watch, short or embed URL.
///
/// Recognises `youtu.be/{id}`, `youtube.com/embed/{id}`,
/// `youtube-nocookie.com/embed/{id}` and `youtube.com/watch?v={id}`.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let path = parsed.path();

    if host.contains("youtu.be") {
        let id = path.trim_matches('/').split('/').next()?;
        return non_empty(Some(id)).map(str::to_string);
    }

    if host.contains("youtube.com") || host.contains("youtube-nocookie.com") {
        if let Some(rest) = path.strip_prefix("/embed/") {
            let id = rest.split('/').next()?;
            return non_empty(Some(id)).map(str::to_string);
        }
        if path == "/watch" {
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .filter(|v| !v.is_empty());
        }
    }

    None
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
