//! Canonical trailer model and provider normalization.

mod normalize;
mod types;

pub use normalize::{
    extract_video_id, normalize, normalize_anilist, normalize_jikan, normalize_record,
};
pub use types::*;
