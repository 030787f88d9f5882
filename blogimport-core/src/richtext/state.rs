//! Intermediate content state
//!
//! Flattens each block's overlapping style and entity ranges into a sequence
//! of runs, each with one style set and at most one entity.

use std::collections::BTreeMap;

use super::document::{Block, BlockType, InlineStyle, RichTextDocument};
use super::entity::Entity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
}

impl StyleSet {
    fn apply(&mut self, style: &InlineStyle) {
        match style {
            InlineStyle::Bold => self.bold = true,
            InlineStyle::Italic => self.italic = true,
            InlineStyle::Underline => self.underline = true,
            InlineStyle::Strikethrough => self.strikethrough = true,
            InlineStyle::Code => self.code = true,
            InlineStyle::Unknown(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub styles: StyleSet,
    /// Key into the entity map; only set when the key resolves
    pub entity: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateBlock {
    pub block_type: BlockType,
    pub depth: usize,
    pub runs: Vec<Run>,
}

impl StateBlock {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentState {
    pub blocks: Vec<StateBlock>,
    pub entity_map: BTreeMap<String, Entity>,
}

impl ContentState {
    pub fn from_document(doc: &RichTextDocument) -> Self {
        let blocks = doc
            .blocks
            .iter()
            .map(|block| StateBlock {
                block_type: block.block_type.clone(),
                depth: block.depth,
                runs: runs_for_block(block, &doc.entity_map),
            })
            .collect();

        Self {
            blocks,
            entity_map: doc.entity_map.clone(),
        }
    }

    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entity_map.get(key)
    }
}

fn covers(offset: usize, length: usize, position: usize) -> bool {
    position >= offset && position < offset.saturating_add(length)
}

fn runs_for_block(block: &Block, entity_map: &BTreeMap<String, Entity>) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    // position in UTF-16 code units
    let mut position = 0usize;

    for ch in block.text.chars() {
        let mut styles = StyleSet::default();
        for range in &block.inline_style_ranges {
            if covers(range.offset, range.length, position) {
                styles.apply(&range.style);
            }
        }

        let entity = block
            .entity_ranges
            .iter()
            .find(|range| covers(range.offset, range.length, position))
            .map(|range| range.key.as_str())
            .filter(|key| entity_map.contains_key(*key))
            .map(str::to_string);

        match runs.last_mut() {
            Some(last) if last.styles == styles && last.entity == entity => last.text.push(ch),
            _ => runs.push(Run {
                text: ch.to_string(),
                styles,
                entity,
            }),
        }

        position += ch.len_utf16();
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> RichTextDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_overlapping_styles_split_runs() {
        let state = ContentState::from_document(&doc(json!({
            "blocks": [{"text": "abcdef", "type": "unstyled",
                "inlineStyleRanges": [
                    {"offset": 0, "length": 4, "style": "BOLD"},
                    {"offset": 2, "length": 4, "style": "ITALIC"}
                ],
                "entityRanges": []}],
            "entityMap": {}
        })));

        let runs = &state.blocks[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text, "ab");
        assert!(runs[0].styles.bold && !runs[0].styles.italic);
        assert_eq!(runs[1].text, "cd");
        assert!(runs[1].styles.bold && runs[1].styles.italic);
        assert_eq!(runs[2].text, "ef");
        assert!(!runs[2].styles.bold && runs[2].styles.italic);
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        // the emoji takes two UTF-16 units
        let state = ContentState::from_document(&doc(json!({
            "blocks": [{"text": "😀ab", "type": "unstyled",
                "inlineStyleRanges": [{"offset": 2, "length": 1, "style": "BOLD"}],
                "entityRanges": []}],
            "entityMap": {}
        })));

        let runs = &state.blocks[0].runs;
        assert_eq!(runs[0].text, "😀");
        assert_eq!(runs[1].text, "a");
        assert!(runs[1].styles.bold);
        assert_eq!(runs[2].text, "b");
    }

    #[test]
    fn test_dangling_entity_key_is_ignored() {
        let state = ContentState::from_document(&doc(json!({
            "blocks": [{"text": "link", "type": "unstyled",
                "inlineStyleRanges": [],
                "entityRanges": [{"offset": 0, "length": 4, "key": 9}]}],
            "entityMap": {}
        })));

        assert_eq!(state.blocks[0].runs.len(), 1);
        assert_eq!(state.blocks[0].runs[0].entity, None);
        assert_eq!(state.blocks[0].text(), "link");
    }
}
