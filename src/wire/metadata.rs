//! Extension metadata packed into a hidden companion item
//!
//! Flags the host schema has no field for (pinned, errorHidden, glesmos)
//! are stored as a JSON document in the body of a secret text item, itself
//! wrapped in a secret folder so the host UI never shows either. Reading is
//! maximally tolerant: absent, unparseable, or unknown-versioned metadata
//! degrades to empty, and version 1 documents are migrated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const METADATA_FOLDER_ID: &str = "__textmode-metadata-folder";
pub const METADATA_ID: &str = "__textmode-metadata";

const CURRENT_VERSION: u64 = 2;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expressions: BTreeMap<String, ItemMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error_hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub glesmos: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.expressions.values().all(|m| m == &ItemMetadata::default())
    }

    pub fn get(&self, id: &str) -> ItemMetadata {
        self.expressions.get(id).copied().unwrap_or_default()
    }

    /// Record `item`, dropping all-default entries to keep the JSON small
    pub fn set(&mut self, id: &str, item: ItemMetadata) {
        if item != ItemMetadata::default() {
            self.expressions.insert(id.to_string(), item);
        }
    }
}

#[derive(Serialize)]
struct VersionedOut<'a> {
    version: u64,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

/// Version 1 stored only a list of pinned ids
#[derive(Deserialize)]
struct VersionOne {
    #[serde(default)]
    pinned: Vec<String>,
}

pub fn to_text(metadata: &Metadata) -> String {
    let out = VersionedOut {
        version: CURRENT_VERSION,
        metadata,
    };
    // serialization of this shape cannot fail
    serde_json::to_string(&out).unwrap_or_default()
}

/// Parse a metadata body. Anything unexpected yields empty metadata.
pub fn from_text(text: &str) -> Metadata {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Metadata::default();
    };
    match value.get("version").and_then(|v| v.as_u64()) {
        Some(CURRENT_VERSION) => {
            serde_json::from_value::<Metadata>(value).unwrap_or_default()
        }
        Some(1) => {
            let Ok(v1) = serde_json::from_value::<VersionOne>(value) else {
                return Metadata::default();
            };
            let mut metadata = Metadata::default();
            for id in v1.pinned {
                metadata.set(
                    &id,
                    ItemMetadata {
                        pinned: true,
                        ..Default::default()
                    },
                );
            }
            metadata
        }
        _ => Metadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut metadata = Metadata::default();
        metadata.set(
            "3",
            ItemMetadata {
                pinned: true,
                error_hidden: false,
                glesmos: true,
            },
        );
        let text = to_text(&metadata);
        assert!(text.contains("\"version\":2"));
        assert_eq!(from_text(&text), metadata);
    }

    #[test]
    fn test_version_one_migrates() {
        let metadata = from_text(r#"{"version":1,"pinned":["a","b"]}"#);
        assert!(metadata.get("a").pinned);
        assert!(metadata.get("b").pinned);
        assert!(!metadata.get("a").glesmos);
    }

    #[test]
    fn test_garbage_degrades_to_empty() {
        assert_eq!(from_text("not json"), Metadata::default());
        assert_eq!(from_text(r#"{"version":99,"weird":[]}"#), Metadata::default());
        assert_eq!(from_text(r#"{"version":2,"expressions":7}"#), Metadata::default());
        assert_eq!(from_text(""), Metadata::default());
    }

    #[test]
    fn test_default_entries_dropped() {
        let mut metadata = Metadata::default();
        metadata.set("x", ItemMetadata::default());
        assert!(metadata.is_empty());
        assert!(metadata.expressions.is_empty());
    }
}
