//! Entity map entries
//!
//! Each entity keeps its raw form next to the interpreted kind, so entities
//! this crate does not understand still re-encode unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LINK_TYPE: &str = "LINK";
pub const IMAGE_TYPE: &str = "IMAGE";
/// Image embedded through the hosted editor's image plugin
pub const PLUGIN_IMAGE_TYPE: &str = "wix-draft-plugin-image";

fn default_mutability() -> String {
    "MUTABLE".to_string()
}

/// Entity as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default = "default_mutability")]
    pub mutability: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Link {
        url: String,
        target: Option<String>,
    },
    Image {
        src: String,
        alt: Option<String>,
        caption: Option<String>,
    },
    /// Plugin image not yet pointed at a resolvable URL
    PluginImage { media_id: Option<String> },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntity", into = "RawEntity")]
pub struct Entity {
    kind: EntityKind,
    raw: RawEntity,
}

impl Entity {
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn raw(&self) -> &RawEntity {
        &self.raw
    }

    pub fn entity_type(&self) -> &str {
        &self.raw.entity_type
    }

    /// Turn a plugin image into a plain image served from `media_base`.
    ///
    /// Returns false and leaves the entity untouched when it is not a plugin
    /// image or carries no media id.
    pub fn canonicalize(&mut self, media_base: &str) -> bool {
        let EntityKind::PluginImage {
            media_id: Some(media_id),
        } = &self.kind
        else {
            return false;
        };

        let url = format!("{}/{}", media_base.trim_end_matches('/'), media_id);
        let mut raw = self.raw.clone();
        raw.entity_type = IMAGE_TYPE.to_string();
        raw.data.remove("src");
        raw.data.insert("url".to_string(), Value::String(url));
        *self = Entity::from(raw);
        true
    }
}

fn str_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Looks in `data` first, then in `data.metadata`
fn str_field_or_metadata(data: &Map<String, Value>, key: &str) -> Option<String> {
    str_field(data, key).or_else(|| {
        data.get("metadata")
            .and_then(Value::as_object)
            .and_then(|metadata| str_field(metadata, key))
    })
}

fn media_id(data: &Map<String, Value>) -> Option<String> {
    let id = data.get("src")?.as_object()?.get("id")?;
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        let data = &raw.data;
        let kind = match raw.entity_type.as_str() {
            LINK_TYPE => match str_field(data, "url").or_else(|| str_field(data, "href")) {
                Some(url) => EntityKind::Link {
                    url,
                    target: str_field(data, "target"),
                },
                None => EntityKind::Unknown,
            },
            IMAGE_TYPE => match str_field(data, "url").or_else(|| str_field(data, "src")) {
                Some(src) => EntityKind::Image {
                    src,
                    alt: str_field_or_metadata(data, "alt"),
                    caption: str_field_or_metadata(data, "caption"),
                },
                None => EntityKind::Unknown,
            },
            PLUGIN_IMAGE_TYPE => EntityKind::PluginImage {
                media_id: media_id(data),
            },
            _ => EntityKind::Unknown,
        };
        Entity { kind, raw }
    }
}

impl From<Entity> for RawEntity {
    fn from(entity: Entity) -> Self {
        entity.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_link_entity() {
        let e = entity(json!({"type": "LINK", "data": {"url": "https://a.example", "target": "_blank"}}));
        assert_eq!(
            e.kind(),
            &EntityKind::Link {
                url: "https://a.example".to_string(),
                target: Some("_blank".to_string())
            }
        );
        assert_eq!(e.raw().mutability, "MUTABLE");
    }

    #[test]
    fn test_canonicalize_plugin_image() {
        let mut e = entity(json!({
            "type": "wix-draft-plugin-image",
            "mutability": "IMMUTABLE",
            "data": {"src": {"id": "abc_123~mv2.jpg", "width": 800}, "metadata": {"alt": "A cat"}}
        }));
        assert_eq!(
            e.kind(),
            &EntityKind::PluginImage {
                media_id: Some("abc_123~mv2.jpg".to_string())
            }
        );

        assert!(e.canonicalize("https://static.example.com/media/"));
        assert_eq!(
            e.kind(),
            &EntityKind::Image {
                src: "https://static.example.com/media/abc_123~mv2.jpg".to_string(),
                alt: Some("A cat".to_string()),
                caption: None
            }
        );

        let raw = serde_json::to_value(&e).unwrap();
        assert_eq!(raw["type"], "IMAGE");
        assert_eq!(raw["mutability"], "IMMUTABLE");
        assert!(raw["data"].get("src").is_none());
        assert_eq!(raw["data"]["url"], "https://static.example.com/media/abc_123~mv2.jpg");
    }

    #[test]
    fn test_canonicalize_leaves_other_entities() {
        let mut link = entity(json!({"type": "LINK", "data": {"url": "u"}}));
        let before = link.clone();
        assert!(!link.canonicalize("https://m"));
        assert_eq!(link, before);

        let mut no_id = entity(json!({"type": "wix-draft-plugin-image", "data": {}}));
        assert!(!no_id.canonicalize("https://m"));
        assert_eq!(no_id.kind(), &EntityKind::PluginImage { media_id: None });
    }

    #[test]
    fn test_unknown_entity_round_trips() {
        let value = json!({"type": "wix-draft-plugin-video", "mutability": "IMMUTABLE", "data": {"src": "v.mp4"}});
        let e = entity(value.clone());
        assert_eq!(e.kind(), &EntityKind::Unknown);
        assert_eq!(serde_json::to_value(&e).unwrap(), value);
    }
}
