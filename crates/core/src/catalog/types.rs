use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::trailer::TrailerRecord;

const ANIME_KEY: &str = "anime";

/// The anime catalog document.
///
/// The document is kept as its original JSON object. Only the `anime` list is
/// lifted out into entries, and it is written back in its original position,
/// so a rewrite leaves every key where it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub anime: Vec<CatalogEntry>,
    document: Map<String, Value>,
}

impl Catalog {
    pub fn new(anime: Vec<CatalogEntry>) -> Self {
        Self {
            anime,
            document: Map::new(),
        }
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_anime = self.document.contains_key(ANIME_KEY);
        let len = self.document.len() + usize::from(!has_anime);

        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.document {
            if key == ANIME_KEY {
                map.serialize_entry(key, &self.anime)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        if !has_anime {
            map.serialize_entry(ANIME_KEY, &self.anime)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut document = Map::<String, Value>::deserialize(deserializer)?;

        // The slot stays in the document to keep its position
        let anime = match document.get_mut(ANIME_KEY) {
            Some(slot) => {
                serde_json::from_value(slot.take()).map_err(de::Error::custom)?
            }
            None => Vec::new(),
        };

        Ok(Self { anime, document })
    }
}

/// One anime in the catalog, backed by its JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntry {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for CatalogEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Read a numeric id stored either as a JSON number or a numeric string.
fn id_value(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

/// Read a stored trailer. Anything that is not a trailer object (an empty
/// string, `false`, mistyped fields) counts as no trailer.
fn trailer_value(value: Option<&Value>) -> Option<TrailerRecord> {
    let value = value?;
    if !value.is_object() {
        return None;
    }
    TrailerRecord::deserialize(value).ok()
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.trim().is_empty())
}

impl CatalogEntry {
    /// A field of the entry object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A field of the entry's `metadata` object.
    pub fn metadata_field(&self, key: &str) -> Option<&Value> {
        self.metadata()?.get(key)
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.fields.get("metadata")?.as_object()
    }

    /// AniList id from `metadata.anilistId`.
    pub fn anilist_id(&self) -> Option<u64> {
        id_value(self.metadata_field("anilistId"))
    }

    /// MyAnimeList id from `metadata.malId`, then `mal_id`, then `malId`.
    pub fn mal_id(&self) -> Option<u64> {
        id_value(self.metadata_field("malId"))
            .or_else(|| id_value(self.get("mal_id")))
            .or_else(|| id_value(self.get("malId")))
    }

    /// Title used for searching: `metadata.title`, then `title`.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.metadata_field("title")).or_else(|| non_blank(self.get("title")))
    }

    /// Title for reports.
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or("Unknown title")
    }

    /// The trailer currently stored for this entry, if any.
    ///
    /// `metadata.trailer` wins; older tools stored it on the entry itself.
    pub fn stored_trailer(&self) -> Option<TrailerRecord> {
        trailer_value(self.metadata_field("trailer")).or_else(|| trailer_value(self.get("trailer")))
    }

    /// Whether the entry holds a trailer with an id or URL.
    pub fn has_trailer(&self) -> bool {
        self.stored_trailer().is_some_and(|t| t.has_signal())
    }

    /// Store a trailer in `metadata.trailer`, or an explicit `null`.
    ///
    /// A legacy entry-level trailer is dropped so the entry has a single
    /// trailer location.
    pub fn set_trailer(&mut self, trailer: Option<TrailerRecord>) {
        self.fields.shift_remove("trailer");
        let value = trailer.as_ref().map_or(Value::Null, Value::from);
        self.set_metadata_field("trailer", value);
    }

    pub fn set_anilist_id(&mut self, anilist_id: u64) {
        self.set_metadata_field("anilistId", Value::from(anilist_id));
    }

    /// Existing keys are overwritten in place; a missing or non-object
    /// `metadata` is replaced by a fresh object.
    fn set_metadata_field(&mut self, key: &str, value: Value) {
        if let Some(Value::Object(metadata)) = self.fields.get_mut("metadata") {
            metadata.insert(key.to_string(), value);
            return;
        }

        let mut metadata = Map::new();
        metadata.insert(key.to_string(), value);
        self.fields
            .insert("metadata".to_string(), Value::Object(metadata));
    }
}
