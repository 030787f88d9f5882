//! Wire types of the block/entity rich-text document
//!
//! Fields this crate does not interpret are kept (`extra`, `data`) so a
//! decoded document re-encodes without losing information.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::entity::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, deserialize_with = "deserialize_entity_map")]
    pub entity_map: BTreeMap<String, Entity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RichTextDocument {
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entity_map.get(key)
    }
}

/// The entity map arrives as an object keyed by id, or as an array when the
/// ids are dense. Null means no entities.
fn deserialize_entity_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EntityMapRepr {
        Map(BTreeMap<String, Entity>),
        List(Vec<Entity>),
    }

    Ok(match Option::<EntityMapRepr>::deserialize(deserializer)? {
        Some(EntityMapRepr::Map(map)) => map,
        Some(EntityMapRepr::List(list)) => list
            .into_iter()
            .enumerate()
            .map(|(i, entity)| (i.to_string(), entity))
            .collect(),
        None => BTreeMap::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub inline_style_ranges: Vec<InlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<EntityRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Block {
    pub fn new(block_type: BlockType, text: impl Into<String>) -> Self {
        Self {
            block_type,
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    #[default]
    Unstyled,
    Paragraph,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    UnorderedListItem,
    OrderedListItem,
    Blockquote,
    CodeBlock,
    Atomic,
    Unknown(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Paragraph => "paragraph",
            BlockType::HeaderOne => "header-one",
            BlockType::HeaderTwo => "header-two",
            BlockType::HeaderThree => "header-three",
            BlockType::HeaderFour => "header-four",
            BlockType::HeaderFive => "header-five",
            BlockType::HeaderSix => "header-six",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::Atomic => "atomic",
            BlockType::Unknown(other) => other,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockType::UnorderedListItem | BlockType::OrderedListItem)
    }
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "unstyled" => BlockType::Unstyled,
            "paragraph" => BlockType::Paragraph,
            "header-one" => BlockType::HeaderOne,
            "header-two" => BlockType::HeaderTwo,
            "header-three" => BlockType::HeaderThree,
            "header-four" => BlockType::HeaderFour,
            "header-five" => BlockType::HeaderFive,
            "header-six" => BlockType::HeaderSix,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            "blockquote" => BlockType::Blockquote,
            "code-block" => BlockType::CodeBlock,
            "atomic" => BlockType::Atomic,
            _ => BlockType::Unknown(s),
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Unknown(String),
}

impl From<String> for InlineStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "BOLD" => InlineStyle::Bold,
            "ITALIC" => InlineStyle::Italic,
            "UNDERLINE" => InlineStyle::Underline,
            "STRIKETHROUGH" => InlineStyle::Strikethrough,
            "CODE" => InlineStyle::Code,
            _ => InlineStyle::Unknown(s),
        }
    }
}

impl From<InlineStyle> for String {
    fn from(style: InlineStyle) -> Self {
        match style {
            InlineStyle::Bold => "BOLD".to_string(),
            InlineStyle::Italic => "ITALIC".to_string(),
            InlineStyle::Underline => "UNDERLINE".to_string(),
            InlineStyle::Strikethrough => "STRIKETHROUGH".to_string(),
            InlineStyle::Code => "CODE".to_string(),
            InlineStyle::Unknown(other) => other,
        }
    }
}

/// Offsets and lengths count UTF-16 code units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

/// Entity map key. Numeric in most documents, a string in some.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum KeyRepr {
            Number(u64),
            Text(String),
        }

        Ok(match KeyRepr::deserialize(deserializer)? {
            KeyRepr::Number(n) => EntityKey(n.to_string()),
            KeyRepr::Text(s) => EntityKey(s),
        })
    }
}

impl Serialize for EntityKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}
