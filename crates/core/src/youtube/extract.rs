//! Extraction of a JSON object embedded in an HTML page.
//!
//! Watch pages inline the player response as a JavaScript assignment
//! (`var ytInitialPlayerResponse = {...};`), usually followed by more script
//! on the same line. The object can contain nested objects and strings with
//! braces or escaped quotes, so the end is found by a scan that tracks
//! string state and brace depth.

use thiserror::Error;

/// Marker that precedes the player response object on watch pages.
pub const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("marker not found")]
    MarkerNotFound,

    #[error("embedded object is not balanced")]
    Unbalanced,
}

/// Return the JSON object that directly follows `marker` in `html`.
///
/// Braces count toward depth only outside double-quoted strings, and a
/// backslash inside a string escapes the next character. The returned slice
/// ends at the brace that brings depth back to zero.
pub fn extract_embedded_json<'a>(html: &'a str, marker: &str) -> Result<&'a str, ExtractError> {
    let start = html.find(marker).ok_or(ExtractError::MarkerNotFound)? + marker.len();
    let body = &html[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // Every delimiter is ASCII, so byte indices are always char boundaries.
    for (idx, byte) in body.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                if depth == 0 {
                    return Err(ExtractError::Unbalanced);
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(&body[..=idx]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Unbalanced)
}
