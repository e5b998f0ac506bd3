//! Embeddability verdicts derived from the watch page player response.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::youtube::{extract_embedded_json, ExtractError, PLAYER_RESPONSE_MARKER};

/// Whether a video can be played inside a third-party iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedVerdict {
    Embeddable,
    NotEmbeddable,
}

impl EmbedVerdict {
    pub fn is_embeddable(&self) -> bool {
        matches!(self, EmbedVerdict::Embeddable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedVerdict::Embeddable => "embeddable",
            EmbedVerdict::NotEmbeddable => "not_embeddable",
        }
    }
}

/// Reasons a watch page yields no verdict.
#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("player response not extracted: {0}")]
    Extract(#[from] ExtractError),

    #[error("player response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(rename = "playabilityStatus", default)]
    playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    playable_in_embed: Option<Value>,
}

/// Decide embeddability from a watch page.
pub fn verdict_from_page(html: &str) -> Result<EmbedVerdict, VerdictError> {
    let json = extract_embedded_json(html, PLAYER_RESPONSE_MARKER)?;
    Ok(verdict_from_player_response(json)?)
}

/// Decide embeddability from the player response JSON.
///
/// The status must be `OK`. `playableInEmbed` only blocks when it is
/// literally `false`; a missing flag is permissive.
pub fn verdict_from_player_response(json: &str) -> Result<EmbedVerdict, serde_json::Error> {
    let response: PlayerResponse = serde_json::from_str(json)?;

    let Some(playability) = response.playability_status else {
        return Ok(EmbedVerdict::NotEmbeddable);
    };

    let status_ok = playability.status.as_deref() == Some("OK");
    let blocked_in_embed = matches!(playability.playable_in_embed, Some(Value::Bool(false)));

    if status_ok && !blocked_in_embed {
        Ok(EmbedVerdict::Embeddable)
    } else {
        Ok(EmbedVerdict::NotEmbeddable)
    }
}
