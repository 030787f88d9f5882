//! Rich-text document to HTML conversion
//!
//! Conversion runs in two stages: the decoded [`RichTextDocument`] is
//! flattened into a [`ContentState`] of styled runs, which is then rendered
//! to HTML. Before that, plugin image entities are rewritten into plain
//! image entities pointing at the static media host.
//!
//! Unknown block and entity types never fail a conversion; only a document
//! that does not decode does.

pub mod document;
pub mod entity;
pub mod html;
pub mod state;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConversionError;

pub use document::{Block, BlockType, EntityKey, EntityRange, InlineStyle, InlineStyleRange, RichTextDocument};
pub use entity::{Entity, EntityKind, RawEntity};
pub use state::ContentState;

#[derive(Debug, Clone)]
pub struct RichTextConverter {
    media_base: String,
}

impl RichTextConverter {
    pub fn new(media_base: impl Into<String>) -> Self {
        let media_base = media_base.into().trim_end_matches('/').to_string();
        Self { media_base }
    }

    pub fn media_base(&self) -> &str {
        &self.media_base
    }

    /// Decode a document delivered either as a JSON string or inline as an
    /// object. Null and blank strings decode to an empty document.
    pub fn decode(&self, content: &Value) -> Result<RichTextDocument, ConversionError> {
        match content {
            Value::Null => Ok(RichTextDocument::default()),
            Value::String(s) if s.trim().is_empty() => Ok(RichTextDocument::default()),
            Value::String(s) => Ok(serde_json::from_str(s)?),
            Value::Object(_) => Ok(RichTextDocument::deserialize(content)?),
            Value::Array(_) => Err(ConversionError::UnsupportedPayload("array")),
            Value::Bool(_) => Err(ConversionError::UnsupportedPayload("boolean")),
            Value::Number(_) => Err(ConversionError::UnsupportedPayload("number")),
        }
    }

    /// Rewrite plugin image entities in place; returns how many were rewritten
    pub fn canonicalize(&self, doc: &mut RichTextDocument) -> usize {
        doc.entity_map
            .values_mut()
            .map(|entity| entity.canonicalize(&self.media_base))
            .filter(|rewritten| *rewritten)
            .count()
    }

    /// Decode, canonicalize and re-encode a document
    pub fn canonicalize_json(&self, content: &Value) -> Result<String, ConversionError> {
        let mut doc = self.decode(content)?;
        self.canonicalize(&mut doc);
        Ok(serde_json::to_string(&doc)?)
    }

    pub fn to_html(&self, doc: &RichTextDocument) -> String {
        html::render(&ContentState::from_document(doc))
    }

    /// Full conversion of a post body: decode, canonicalize, re-encode, render.
    /// A missing body converts to an empty string.
    pub fn convert(&self, content: Option<&Value>) -> Result<String, ConversionError> {
        let Some(content) = content else {
            return Ok(String::new());
        };
        let encoded = self.canonicalize_json(content)?;
        let doc: RichTextDocument = serde_json::from_str(&encoded)?;
        tracing::trace!(
            blocks = doc.blocks.len(),
            entities = doc.entity_map.len(),
            "converting rich-text document"
        );
        Ok(self.to_html(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MEDIA: &str = "https://static.example.com/media";

    fn converter() -> RichTextConverter {
        RichTextConverter::new(format!("{MEDIA}/"))
    }

    fn image_post() -> Value {
        json!({
            "blocks": [
                {"key": "a", "text": "Intro", "type": "unstyled", "depth": 0,
                 "inlineStyleRanges": [], "entityRanges": []},
                {"key": "b", "text": " ", "type": "atomic", "depth": 0,
                 "inlineStyleRanges": [], "entityRanges": [{"offset": 0, "length": 1, "key": 0}]}
            ],
            "entityMap": {
                "0": {"type": "wix-draft-plugin-image", "mutability": "IMMUTABLE",
                      "data": {"src": {"id": "8bb438_abc~mv2.jpg"}}}
            }
        })
    }

    #[test]
    fn test_embedded_image_points_at_media_base() {
        let html = converter().convert(Some(&image_post())).unwrap();
        assert_eq!(
            html,
            "<p>Intro</p><figure><img src=\"https://static.example.com/media/8bb438_abc~mv2.jpg\" alt=\"\"></figure>"
        );
    }

    #[test]
    fn test_string_payload_decodes_like_object() {
        let as_string = Value::String(image_post().to_string());
        let c = converter();
        assert_eq!(
            c.convert(Some(&as_string)).unwrap(),
            c.convert(Some(&image_post())).unwrap()
        );
    }

    #[test]
    fn test_document_without_images_has_no_media_refs() {
        let content = json!({
            "blocks": [{"text": "see https://static.example.com/media", "type": "unstyled",
                        "inlineStyleRanges": [], "entityRanges": []}],
            "entityMap": {}
        });
        let html = converter().convert(Some(&content)).unwrap();
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_canonicalize_json_rewrites_entity() {
        let encoded = converter().canonicalize_json(&image_post()).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        let entity = &value["entityMap"]["0"];
        assert_eq!(entity["type"], "IMAGE");
        assert_eq!(entity["data"]["url"], format!("{MEDIA}/8bb438_abc~mv2.jpg"));
        assert!(entity["data"].get("src").is_none());
    }

    #[test]
    fn test_convert_renders_the_reencoded_document() {
        let c = converter();
        let encoded = c.canonicalize_json(&image_post()).unwrap();
        let reencoded = c.convert(Some(&Value::String(encoded))).unwrap();
        assert_eq!(c.convert(Some(&image_post())).unwrap(), reencoded);
    }

    #[test]
    fn test_missing_and_null_content() {
        let c = converter();
        assert_eq!(c.convert(None).unwrap(), "");
        assert_eq!(c.convert(Some(&Value::Null)).unwrap(), "");
        assert_eq!(c.convert(Some(&json!(""))).unwrap(), "");
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let c = converter();
        assert!(matches!(
            c.convert(Some(&json!("{not json"))),
            Err(ConversionError::Decode(_))
        ));
        assert!(matches!(
            c.convert(Some(&json!({"blocks": "nope"}))),
            Err(ConversionError::Decode(_))
        ));
        assert!(matches!(
            c.convert(Some(&json!(42))),
            Err(ConversionError::UnsupportedPayload("number"))
        ));
    }
}
