//! HTML rendering of a content state

use super::document::BlockType;
use super::entity::EntityKind;
use super::state::{ContentState, Run, StateBlock};

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Open lists, indexed by depth. Every open list has an open `<li>`.
#[derive(Default)]
struct ListStack {
    open: Vec<ListKind>,
}

impl ListStack {
    fn item(&mut self, out: &mut String, kind: ListKind, depth: usize) {
        // a list can only nest one level below the current one
        let depth = depth.min(self.open.len());
        while self.open.len() > depth + 1 {
            self.close_one(out);
        }
        if self.open.len() == depth + 1 && self.open[depth] != kind {
            self.close_one(out);
        }
        if self.open.len() == depth + 1 {
            out.push_str("</li>");
        } else {
            out.push('<');
            out.push_str(kind.tag());
            out.push('>');
            self.open.push(kind);
        }
        out.push_str("<li>");
    }

    fn close_one(&mut self, out: &mut String) {
        if let Some(kind) = self.open.pop() {
            out.push_str("</li></");
            out.push_str(kind.tag());
            out.push('>');
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.close_one(out);
        }
    }
}

pub fn render(state: &ContentState) -> String {
    let mut out = String::new();
    let mut lists = ListStack::default();

    for block in &state.blocks {
        match block.block_type {
            BlockType::UnorderedListItem => {
                lists.item(&mut out, ListKind::Unordered, block.depth);
                out.push_str(&render_inline(state, block));
                continue;
            }
            BlockType::OrderedListItem => {
                lists.item(&mut out, ListKind::Ordered, block.depth);
                out.push_str(&render_inline(state, block));
                continue;
            }
            _ => lists.close_all(&mut out),
        }

        match &block.block_type {
            BlockType::Atomic => render_atomic(&mut out, state, block),
            BlockType::CodeBlock => {
                out.push_str("<pre><code>");
                out.push_str(&render_inline(state, block));
                out.push_str("</code></pre>");
            }
            other => {
                let tag = block_tag(other);
                out.push('<');
                out.push_str(tag);
                out.push('>');
                out.push_str(&render_inline(state, block));
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    lists.close_all(&mut out);
    out
}

fn block_tag(block_type: &BlockType) -> &'static str {
    match block_type {
        BlockType::HeaderOne => "h1",
        BlockType::HeaderTwo => "h2",
        BlockType::HeaderThree => "h3",
        BlockType::HeaderFour => "h4",
        BlockType::HeaderFive => "h5",
        BlockType::HeaderSix => "h6",
        BlockType::Blockquote => "blockquote",
        _ => "p",
    }
}

/// Atomic blocks carry a placeholder character and one entity. Images become
/// figures, anything else is dropped unless it has real text.
fn render_atomic(out: &mut String, state: &ContentState, block: &StateBlock) {
    let mut rendered_image = false;
    for run in &block.runs {
        let Some(entity) = run.entity.as_deref().and_then(|key| state.entity(key)) else {
            continue;
        };
        if let EntityKind::Image { src, alt, caption } = entity.kind() {
            out.push_str("<figure>");
            out.push_str(&image_tag(src, alt.as_deref()));
            if let Some(caption) = caption {
                out.push_str("<figcaption>");
                out.push_str(&escape_text(caption));
                out.push_str("</figcaption>");
            }
            out.push_str("</figure>");
            rendered_image = true;
        }
    }

    if !rendered_image && !block.text().trim().is_empty() {
        out.push_str("<p>");
        out.push_str(&render_inline(state, block));
        out.push_str("</p>");
    }
}

fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\">",
        escape_attr(src),
        escape_attr(alt.unwrap_or(""))
    )
}

/// Renders runs, grouping neighbours that share an entity so a link spanning
/// several styles becomes one anchor.
fn render_inline(state: &ContentState, block: &StateBlock) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < block.runs.len() {
        let entity_key = block.runs[i].entity.as_deref();
        let mut j = i + 1;
        while j < block.runs.len() && block.runs[j].entity.as_deref() == entity_key {
            j += 1;
        }
        let group = &block.runs[i..j];
        let inner: String = group.iter().map(styled_text).collect();

        match entity_key.and_then(|key| state.entity(key)).map(|e| e.kind()) {
            Some(EntityKind::Link { url, target }) => {
                out.push_str("<a href=\"");
                out.push_str(&escape_attr(url));
                out.push('"');
                if let Some(target) = target {
                    out.push_str(" target=\"");
                    out.push_str(&escape_attr(target));
                    out.push('"');
                }
                out.push('>');
                out.push_str(&inner);
                out.push_str("</a>");
            }
            Some(EntityKind::Image { src, alt, .. }) => {
                out.push_str(&image_tag(src, alt.as_deref()));
            }
            // unresolved plugin images have nothing to point at
            Some(EntityKind::PluginImage { .. }) => {}
            Some(EntityKind::Unknown) | None => out.push_str(&inner),
        }

        i = j;
    }
    out
}

fn styled_text(run: &Run) -> String {
    let mut text = escape_text(&run.text).replace('\n', "<br>");
    let styles = run.styles;
    let tags = [
        (styles.code, "code"),
        (styles.strikethrough, "del"),
        (styles.underline, "u"),
        (styles.italic, "em"),
        (styles.bold, "strong"),
    ];
    for (enabled, tag) in tags {
        if enabled {
            text = format!("<{tag}>{text}</{tag}>");
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::document::RichTextDocument;
    use serde_json::json;

    fn html(value: serde_json::Value) -> String {
        let doc: RichTextDocument = serde_json::from_value(value).unwrap();
        render(&ContentState::from_document(&doc))
    }

    fn block(kind: &str, text: &str) -> serde_json::Value {
        json!({"text": text, "type": kind, "inlineStyleRanges": [], "entityRanges": []})
    }

    #[test]
    fn test_block_tags() {
        let out = html(json!({
            "blocks": [block("header-one", "Title"), block("unstyled", "Body"),
                       block("blockquote", "Quote"), block("header-six", "Small")],
            "entityMap": {}
        }));
        assert_eq!(
            out,
            "<h1>Title</h1><p>Body</p><blockquote>Quote</blockquote><h6>Small</h6>"
        );
    }

    #[test]
    fn test_inline_styles_nest_in_fixed_order() {
        let out = html(json!({
            "blocks": [{"text": "hi there", "type": "unstyled",
                "inlineStyleRanges": [
                    {"offset": 0, "length": 2, "style": "ITALIC"},
                    {"offset": 0, "length": 2, "style": "BOLD"}
                ],
                "entityRanges": []}],
            "entityMap": {}
        }));
        assert_eq!(out, "<p><strong><em>hi</em></strong> there</p>");
    }

    #[test]
    fn test_link_spanning_styles_is_one_anchor() {
        let out = html(json!({
            "blocks": [{"text": "go here", "type": "unstyled",
                "inlineStyleRanges": [{"offset": 3, "length": 4, "style": "BOLD"}],
                "entityRanges": [{"offset": 0, "length": 7, "key": 0}]}],
            "entityMap": {"0": {"type": "LINK", "data": {"url": "https://a.example/?x=1&y=2"}}}
        }));
        assert_eq!(
            out,
            "<p><a href=\"https://a.example/?x=1&amp;y=2\">go <strong>here</strong></a></p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let out = html(json!({"blocks": [block("unstyled", "a < b & \"c\"\nd")], "entityMap": {}}));
        assert_eq!(out, "<p>a &lt; b &amp; \"c\"<br>d</p>");
    }

    #[test]
    fn test_nested_lists() {
        let mut nested = block("unordered-list-item", "b");
        nested["depth"] = json!(1);
        let out = html(json!({
            "blocks": [block("unordered-list-item", "a"), nested,
                       block("unordered-list-item", "c"), block("ordered-list-item", "one"),
                       block("unstyled", "after")],
            "entityMap": {}
        }));
        assert_eq!(
            out,
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul><ol><li>one</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_atomic_image_becomes_figure() {
        let out = html(json!({
            "blocks": [{"text": " ", "type": "atomic", "inlineStyleRanges": [],
                        "entityRanges": [{"offset": 0, "length": 1, "key": 0}]}],
            "entityMap": {"0": {"type": "IMAGE", "data": {"url": "https://m/x.jpg", "caption": "Cap"}}}
        }));
        assert_eq!(
            out,
            "<figure><img src=\"https://m/x.jpg\" alt=\"\"><figcaption>Cap</figcaption></figure>"
        );
    }

    #[test]
    fn test_unknown_block_and_entity_fall_back() {
        let out = html(json!({
            "blocks": [
                {"text": "odd", "type": "wix-draft-plugin-divider", "inlineStyleRanges": [], "entityRanges": []},
                {"text": " ", "type": "atomic", "inlineStyleRanges": [],
                 "entityRanges": [{"offset": 0, "length": 1, "key": 0}]},
                block("unstyled", "")
            ],
            "entityMap": {"0": {"type": "wix-draft-plugin-video", "data": {}}}
        }));
        assert_eq!(out, "<p>odd</p><p></p>");
    }
}
