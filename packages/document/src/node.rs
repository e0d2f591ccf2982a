//! # Document Nodes
//!
//! Typed block/inline tree. The serialized form is the usual rich-text
//! JSON shape: `{"type": ..., "attrs": {...}, "content": [...], "text": ...}`.
//!
//! Content rules are deliberately small:
//! - `doc`, `blockquote`, list items and table cells hold blocks
//! - textblocks (`paragraph`, `heading`, `codeBlock`) hold inline nodes
//! - lists hold their item type, tables hold rows, rows hold cells

use crate::DocumentError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Node attributes (`level`, `src`, `checked`, ...)
pub type Attrs = BTreeMap<String, Value>;

/// Node type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    Text,
    HardBreak,
    BulletList,
    OrderedList,
    TaskList,
    ListItem,
    TaskItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Image,
    Table,
    TableRow,
    TableHeader,
    TableCell,
}

impl NodeKind {
    /// Name as it appears in the `type` field
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Text => "text",
            NodeKind::HardBreak => "hardBreak",
            NodeKind::BulletList => "bulletList",
            NodeKind::OrderedList => "orderedList",
            NodeKind::TaskList => "taskList",
            NodeKind::ListItem => "listItem",
            NodeKind::TaskItem => "taskItem",
            NodeKind::Blockquote => "blockquote",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::HorizontalRule => "horizontalRule",
            NodeKind::Image => "image",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableHeader => "tableHeader",
            NodeKind::TableCell => "tableCell",
        }
    }

    pub fn is_text(self) -> bool {
        self == NodeKind::Text
    }

    /// Atom nodes occupying a single position
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::HardBreak | NodeKind::HorizontalRule | NodeKind::Image
        )
    }

    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::HardBreak)
    }

    /// Blocks whose content is inline text
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Heading | NodeKind::CodeBlock
        )
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            NodeKind::BulletList | NodeKind::OrderedList | NodeKind::TaskList
        )
    }

    pub fn is_list_item(self) -> bool {
        matches!(self, NodeKind::ListItem | NodeKind::TaskItem)
    }

    /// Nodes allowed directly inside block containers
    pub fn is_block(self) -> bool {
        self.is_textblock()
            || self.is_list()
            || matches!(
                self,
                NodeKind::Blockquote
                    | NodeKind::HorizontalRule
                    | NodeKind::Image
                    | NodeKind::Table
            )
    }

    /// Item type a list of this kind holds
    pub fn list_item_kind(self) -> Option<NodeKind> {
        match self {
            NodeKind::BulletList | NodeKind::OrderedList => Some(NodeKind::ListItem),
            NodeKind::TaskList => Some(NodeKind::TaskItem),
            _ => None,
        }
    }

    /// Whether `child` may appear directly inside a node of this kind
    pub fn allows_child(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Doc
            | NodeKind::Blockquote
            | NodeKind::ListItem
            | NodeKind::TaskItem
            | NodeKind::TableHeader
            | NodeKind::TableCell => child.is_block(),
            NodeKind::Paragraph | NodeKind::Heading => child.is_inline(),
            NodeKind::CodeBlock => child.is_text(),
            NodeKind::BulletList | NodeKind::OrderedList => child == NodeKind::ListItem,
            NodeKind::TaskList => child == NodeKind::TaskItem,
            NodeKind::Table => child == NodeKind::TableRow,
            NodeKind::TableRow => matches!(child, NodeKind::TableHeader | NodeKind::TableCell),
            NodeKind::Text | NodeKind::HardBreak | NodeKind::HorizontalRule | NodeKind::Image => {
                false
            }
        }
    }

    /// Containers that must hold at least one child
    fn requires_content(self) -> bool {
        self.is_list()
            || self.is_list_item()
            || matches!(
                self,
                NodeKind::Blockquote
                    | NodeKind::Table
                    | NodeKind::TableRow
                    | NodeKind::TableHeader
                    | NodeKind::TableCell
            )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    pub fn doc(blocks: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc).with_content(blocks)
    }

    /// Paragraph holding `text` (no content when `text` is empty)
    pub fn paragraph(text: &str) -> Self {
        Self::textblock(NodeKind::Paragraph, text)
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Self::textblock(NodeKind::Heading, text).with_attr("level", level)
    }

    pub fn horizontal_rule() -> Self {
        Self::new(NodeKind::HorizontalRule)
    }

    /// Image placeholder; `src` stays null until an upload resolves
    pub fn image(src: Option<&str>) -> Self {
        Self::new(NodeKind::Image)
            .with_attr("src", src)
            .with_attr("alt", Value::Null)
    }

    /// Table of empty cells; the first row uses header cells when `header_row` is set
    pub fn table(rows: usize, cols: usize, header_row: bool) -> Self {
        let rows = (0..rows)
            .map(|row| {
                let cell_kind = if header_row && row == 0 {
                    NodeKind::TableHeader
                } else {
                    NodeKind::TableCell
                };
                let cells = (0..cols)
                    .map(|_| {
                        Node::new(cell_kind)
                            .with_attr("colspan", 1)
                            .with_attr("rowspan", 1)
                            .with_content(vec![Node::new(NodeKind::Paragraph)])
                    })
                    .collect();
                Node::new(NodeKind::TableRow).with_content(cells)
            })
            .collect();
        Self::new(NodeKind::Table).with_content(rows)
    }

    fn textblock(kind: NodeKind, text: &str) -> Self {
        let node = Self::new(kind);
        if text.is_empty() {
            node
        } else {
            node.with_content(vec![Node::text(text)])
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Number of positions this node occupies in its parent
    pub fn size(&self) -> usize {
        if self.kind.is_text() {
            self.text.as_deref().map_or(0, |text| text.chars().count())
        } else if self.kind.is_leaf() {
            1
        } else {
            self.content_size() + 2
        }
    }

    /// Number of positions between the opening and closing token
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::size).sum()
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.get(key).and_then(Value::as_u64)
    }

    /// Check content rules for this node and its descendants
    pub fn validate(&self) -> Result<(), DocumentError> {
        match (self.kind, self.text.as_deref()) {
            (NodeKind::Text, Some(text)) if !text.is_empty() => {
                if !self.content.is_empty() {
                    return Err(DocumentError::InvalidStructure(
                        "text nodes cannot have content".to_string(),
                    ));
                }
                return Ok(());
            }
            (NodeKind::Text, _) => {
                return Err(DocumentError::InvalidStructure(
                    "text nodes require non-empty text".to_string(),
                ));
            }
            (kind, Some(_)) => {
                return Err(DocumentError::InvalidStructure(format!(
                    "{} nodes cannot carry text",
                    kind
                )));
            }
            _ => {}
        }

        if self.kind.is_leaf() && !self.content.is_empty() {
            return Err(DocumentError::InvalidStructure(format!(
                "{} nodes cannot have content",
                self.kind
            )));
        }

        if self.kind.requires_content() && self.content.is_empty() {
            return Err(DocumentError::InvalidStructure(format!(
                "{} nodes require at least one child",
                self.kind
            )));
        }

        if self.kind == NodeKind::Heading {
            match self.attr_u64("level") {
                Some(1..=6) => {}
                other => {
                    return Err(DocumentError::InvalidStructure(format!(
                        "heading level must be 1-6, got {:?}",
                        other
                    )));
                }
            }
        }

        for child in &self.content {
            if !self.kind.allows_child(child.kind) {
                return Err(DocumentError::InvalidStructure(format!(
                    "{} is not allowed inside {}",
                    child.kind, self.kind
                )));
            }
            child.validate()?;
        }

        Ok(())
    }

    /// Merge adjacent text nodes and drop empty ones
    pub fn normalize(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.content.len());

        for mut child in std::mem::take(&mut self.content) {
            if !child.kind.is_text() {
                child.normalize();
                merged.push(child);
                continue;
            }

            let text = child.text.unwrap_or_default();
            if text.is_empty() {
                continue;
            }
            match merged.last_mut().filter(|last| last.kind.is_text()) {
                Some(last) => last.text.get_or_insert_with(String::new).push_str(&text),
                None => merged.push(Node::text(text)),
            }
        }

        self.content = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let node = Node::heading(1, "Hi");
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "heading",
                "attrs": { "level": 1 },
                "content": [{ "type": "text", "text": "Hi" }]
            })
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<Node, _> = serde_json::from_value(json!({ "type": "carousel" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Node::text("héllo").size(), 5);
        assert_eq!(Node::paragraph("").size(), 2);
        assert_eq!(Node::paragraph("abc").size(), 5);
        assert_eq!(Node::horizontal_rule().size(), 1);

        // table > row > cell > paragraph: 3 rows * (2 + 3 * (2 + 2)) + 2
        assert_eq!(Node::table(3, 3, true).size(), 44);
    }

    #[test]
    fn test_table_header_row() {
        let table = Node::table(3, 3, true);

        assert_eq!(table.content.len(), 3);
        assert!(table.content[0]
            .content
            .iter()
            .all(|cell| cell.kind == NodeKind::TableHeader));
        assert!(table.content[1..]
            .iter()
            .flat_map(|row| &row.content)
            .all(|cell| cell.kind == NodeKind::TableCell));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_nesting() {
        let doc = Node::doc(vec![Node::text("loose text")]);
        assert!(doc.validate().is_err());

        let list = Node::new(NodeKind::BulletList).with_content(vec![Node::paragraph("x")]);
        assert!(list.validate().is_err());

        let empty_quote = Node::new(NodeKind::Blockquote);
        assert!(empty_quote.validate().is_err());
    }

    #[test]
    fn test_validate_heading_level() {
        assert!(Node::heading(3, "ok").validate().is_ok());
        assert!(Node::heading(7, "too deep").validate().is_err());
        assert!(Node::paragraph("x")
            .with_attr("level", 2)
            .validate()
            .is_ok());
        assert!(Node::new(NodeKind::Heading).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_text() {
        let paragraph = Node::new(NodeKind::Paragraph).with_content(vec![Node::text("")]);
        assert!(paragraph.validate().is_err());
    }

    #[test]
    fn test_normalize_merges_text() {
        let mut paragraph = Node::new(NodeKind::Paragraph).with_content(vec![
            Node::text("Hel"),
            Node::text(""),
            Node::text("lo"),
            Node::new(NodeKind::HardBreak),
            Node::text("!"),
        ]);

        paragraph.normalize();

        assert_eq!(paragraph.content.len(), 3);
        assert_eq!(paragraph.content[0].text.as_deref(), Some("Hello"));
        assert_eq!(paragraph.size(), 9);
    }
}
