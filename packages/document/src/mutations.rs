//! # Document Mutations
//!
//! The block-level operations slash commands and remote updates issue.
//!
//! ## Semantics
//!
//! ### DeleteRange
//! - Both ends must sit in the same textblock
//! - Removes inline content only, never whole blocks
//!
//! ### SetBlockType
//! - Retypes the textblock containing `pos`, keeping its inline content
//!
//! ### ToggleList
//! - Inside a list of the same kind: lifts the whole list back to blocks
//! - Inside a list of another kind: converts the list and its items
//! - Otherwise: wraps the textblock in a single-item list
//!
//! ### InsertBlock
//! - Inside an empty textblock: replaces that textblock
//! - At the start/end of a textblock: inserts before/after it
//! - Mid-text: splits the textblock around the new block

use crate::position::{node_at_path, node_at_path_mut, resolve};
use crate::{Attrs, DocumentError, Node, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structural operations on a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert plain text at a position inside a textblock
    InsertText { pos: usize, text: String },

    /// Remove the inline content between two positions
    DeleteRange { from: usize, to: usize },

    /// Retype the textblock containing `pos`
    SetBlockType {
        pos: usize,
        kind: NodeKind,
        attrs: Attrs,
    },

    /// Wrap, convert or lift the list around the textblock at `pos`
    ToggleList { pos: usize, kind: NodeKind },

    /// Wrap the textblock at `pos` in a block container
    Wrap { pos: usize, kind: NodeKind },

    /// Insert a block at `pos`
    InsertBlock { pos: usize, node: Node },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Position {pos} is outside the document (size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("Range {from}..{to} spans more than one textblock")]
    RangeSpansBlocks { from: usize, to: usize },

    #[error("Position {0} is not inside a textblock")]
    NotInTextblock(usize),

    #[error("Unsupported node type for this mutation: {0}")]
    UnsupportedKind(NodeKind),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl From<DocumentError> for MutationError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::PositionOutOfRange { pos, size } => {
                MutationError::PositionOutOfRange { pos, size }
            }
            other => MutationError::InvalidStructure(other.to_string()),
        }
    }
}

impl Mutation {
    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertText { .. } => "insert_text",
            Mutation::DeleteRange { .. } => "delete_range",
            Mutation::SetBlockType { .. } => "set_block_type",
            Mutation::ToggleList { .. } => "toggle_list",
            Mutation::Wrap { .. } => "wrap",
            Mutation::InsertBlock { .. } => "insert_block",
        }
    }

    /// Apply to a `doc` root. Validation of the resulting tree is left to
    /// the caller so batches are checked once.
    pub(crate) fn apply_to(&self, root: &mut Node) -> Result<(), MutationError> {
        match self {
            Mutation::InsertText { pos, text } => Self::apply_insert_text(root, *pos, text),

            Mutation::DeleteRange { from, to } => Self::apply_delete_range(root, *from, *to),

            Mutation::SetBlockType { pos, kind, attrs } => {
                Self::apply_set_block_type(root, *pos, *kind, attrs)
            }

            Mutation::ToggleList { pos, kind } => Self::apply_toggle_list(root, *pos, *kind),

            Mutation::Wrap { pos, kind } => Self::apply_wrap(root, *pos, *kind),

            Mutation::InsertBlock { pos, node } => Self::apply_insert_block(root, *pos, node),
        }
    }

    fn apply_insert_text(root: &mut Node, pos: usize, text: &str) -> Result<(), MutationError> {
        if text.is_empty() {
            return Ok(());
        }

        let (path, offset) = textblock_at(root, pos)?;
        let block = expect_node_mut(root, &path)?;

        let (mut left, right) = split_inline(std::mem::take(&mut block.content), offset);
        left.push(Node::text(text));
        left.extend(right);
        block.content = left;

        Ok(())
    }

    fn apply_delete_range(root: &mut Node, from: usize, to: usize) -> Result<(), MutationError> {
        if from > to {
            return Err(MutationError::InvalidRange { from, to });
        }
        if from == to {
            return Ok(());
        }

        let (path, start) = textblock_at(root, from)?;
        let (end_path, end) = textblock_at(root, to)?;
        if path != end_path {
            return Err(MutationError::RangeSpansBlocks { from, to });
        }

        let block = expect_node_mut(root, &path)?;
        let (mut left, rest) = split_inline(std::mem::take(&mut block.content), start);
        let (_, right) = split_inline(rest, end - start);
        left.extend(right);
        block.content = left;

        Ok(())
    }

    fn apply_set_block_type(
        root: &mut Node,
        pos: usize,
        kind: NodeKind,
        attrs: &Attrs,
    ) -> Result<(), MutationError> {
        if !kind.is_textblock() {
            return Err(MutationError::UnsupportedKind(kind));
        }

        let (path, _) = textblock_at(root, pos)?;
        let block = expect_node_mut(root, &path)?;

        block.kind = kind;
        block.attrs = attrs.clone();
        if kind == NodeKind::CodeBlock {
            // code blocks hold plain text only
            block.content = std::mem::take(&mut block.content)
                .into_iter()
                .map(|node| match node.kind {
                    NodeKind::HardBreak => Node::text("\n"),
                    _ => node,
                })
                .collect();
        }

        Ok(())
    }

    fn apply_toggle_list(root: &mut Node, pos: usize, kind: NodeKind) -> Result<(), MutationError> {
        let item_kind = kind
            .list_item_kind()
            .ok_or(MutationError::UnsupportedKind(kind))?;

        let (path, _) = textblock_at(root, pos)?;

        if let Some(list_path) = enclosing_list(root, &path) {
            let list = expect_node_mut(root, &list_path)?;

            if list.kind != kind {
                list.kind = kind;
                for item in &mut list.content {
                    item.kind = item_kind;
                    item.attrs = list_item_attrs(item_kind);
                }
                return Ok(());
            }

            let blocks: Vec<Node> = std::mem::take(&mut list.content)
                .into_iter()
                .flat_map(|item| item.content)
                .collect();
            let (parent_path, index) = split_last(&list_path)?;
            let parent = expect_node_mut(root, parent_path)?;
            parent.content.splice(index..=index, blocks);
            return Ok(());
        }

        let (parent_path, index) = split_last(&path)?;
        let parent = expect_node_mut(root, parent_path)?;
        let block = parent.content.remove(index);
        let item = Node::new(item_kind)
            .with_attrs(list_item_attrs(item_kind))
            .with_content(vec![block]);
        parent
            .content
            .insert(index, Node::new(kind).with_content(vec![item]));

        Ok(())
    }

    fn apply_wrap(root: &mut Node, pos: usize, kind: NodeKind) -> Result<(), MutationError> {
        if kind != NodeKind::Blockquote {
            return Err(MutationError::UnsupportedKind(kind));
        }

        let (path, _) = textblock_at(root, pos)?;
        let (parent_path, index) = split_last(&path)?;
        let parent = expect_node_mut(root, parent_path)?;

        if parent.kind == kind {
            return Ok(());
        }

        let block = parent.content.remove(index);
        parent
            .content
            .insert(index, Node::new(kind).with_content(vec![block]));

        Ok(())
    }

    fn apply_insert_block(root: &mut Node, pos: usize, node: &Node) -> Result<(), MutationError> {
        if !node.kind.is_block() {
            return Err(MutationError::UnsupportedKind(node.kind));
        }

        let resolved = resolve(root, pos)?;
        let target = expect_node(root, &resolved.path)?;

        if !target.kind.is_textblock() {
            if !target.kind.allows_child(node.kind) {
                return Err(MutationError::InvalidStructure(format!(
                    "{} is not allowed inside {}",
                    node.kind, target.kind
                )));
            }
            let index = child_index_at(target, resolved.offset)?;
            let target = expect_node_mut(root, &resolved.path)?;
            target.content.insert(index, node.clone());
            return Ok(());
        }

        let (container_path, index) = split_last(&resolved.path)?;
        let container = expect_node_mut(root, container_path)?;
        if !container.kind.allows_child(node.kind) {
            return Err(MutationError::InvalidStructure(format!(
                "{} is not allowed inside {}",
                node.kind, container.kind
            )));
        }

        let block = &mut container.content[index];
        if block.content.is_empty() {
            container.content[index] = node.clone();
        } else if resolved.offset == 0 {
            container.content.insert(index, node.clone());
        } else if resolved.offset >= block.content_size() {
            container.content.insert(index + 1, node.clone());
        } else {
            let (left, right) = split_inline(std::mem::take(&mut block.content), resolved.offset);
            block.content = left;
            let tail = Node::new(block.kind)
                .with_attrs(block.attrs.clone())
                .with_content(right);
            container
                .content
                .splice(index + 1..index + 1, [node.clone(), tail]);
        }

        Ok(())
    }
}

/// Path and offset of the textblock holding `pos`
fn textblock_at(root: &Node, pos: usize) -> Result<(Vec<usize>, usize), MutationError> {
    let resolved = resolve(root, pos)?;
    let parent = expect_node(root, &resolved.path)?;
    if !parent.kind.is_textblock() {
        return Err(MutationError::NotInTextblock(pos));
    }
    Ok((resolved.path, resolved.offset))
}

/// Path of the list directly around the textblock at `path`, if any
fn enclosing_list(root: &Node, path: &[usize]) -> Option<Vec<usize>> {
    if path.len() < 3 {
        return None;
    }
    let item_path = &path[..path.len() - 1];
    let list_path = &path[..path.len() - 2];

    let item = node_at_path(root, item_path)?;
    let list = node_at_path(root, list_path)?;
    (item.kind.is_list_item() && list.kind.is_list()).then(|| list_path.to_vec())
}

fn list_item_attrs(kind: NodeKind) -> Attrs {
    let mut attrs = Attrs::new();
    if kind == NodeKind::TaskItem {
        attrs.insert("checked".to_string(), Value::Bool(false));
    }
    attrs
}

fn split_last(path: &[usize]) -> Result<(&[usize], usize), MutationError> {
    match path.split_last() {
        Some((&index, parent)) => Ok((parent, index)),
        None => Err(MutationError::InvalidStructure(
            "the document root has no parent".to_string(),
        )),
    }
}

fn expect_node<'a>(root: &'a Node, path: &[usize]) -> Result<&'a Node, MutationError> {
    node_at_path(root, path)
        .ok_or_else(|| MutationError::InvalidStructure(format!("no node at path {:?}", path)))
}

fn expect_node_mut<'a>(root: &'a mut Node, path: &[usize]) -> Result<&'a mut Node, MutationError> {
    node_at_path_mut(root, path)
        .ok_or_else(|| MutationError::InvalidStructure(format!("no node at path {:?}", path)))
}

/// Index of the child boundary at `offset` within `node`'s content
fn child_index_at(node: &Node, offset: usize) -> Result<usize, MutationError> {
    let mut start = 0;
    for (index, child) in node.content.iter().enumerate() {
        if start == offset {
            return Ok(index);
        }
        start += child.size();
    }
    if start == offset {
        Ok(node.content.len())
    } else {
        Err(MutationError::InvalidStructure(format!(
            "offset {} does not fall between children of {}",
            offset, node.kind
        )))
    }
}

/// Split inline content at a character offset
fn split_inline(content: Vec<Node>, offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut start = 0;

    for node in content {
        let size = node.size();
        if start + size <= offset {
            left.push(node);
        } else if start >= offset {
            right.push(node);
        } else {
            // only text nodes span more than one position
            let text = node.text.unwrap_or_default();
            let (head, tail) = split_chars(&text, offset - start);
            left.push(Node::text(head));
            right.push(Node::text(tail));
        }
        start += size;
    }

    (left, right)
}

fn split_chars(text: &str, at: usize) -> (String, String) {
    let byte = text
        .char_indices()
        .nth(at)
        .map_or(text.len(), |(index, _)| index);
    (text[..byte].to_string(), text[byte..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chars_multibyte() {
        assert_eq!(split_chars("héllo", 2), ("hé".to_string(), "llo".to_string()));
        assert_eq!(split_chars("abc", 5), ("abc".to_string(), String::new()));
    }

    #[test]
    fn test_split_inline_around_hard_break() {
        let content = vec![
            Node::text("ab"),
            Node::new(NodeKind::HardBreak),
            Node::text("cd"),
        ];

        let (left, right) = split_inline(content, 3);

        assert_eq!(left.len(), 2);
        assert_eq!(left[1].kind, NodeKind::HardBreak);
        assert_eq!(right, vec![Node::text("cd")]);
    }

    #[test]
    fn test_child_index_at() {
        let doc = Node::doc(vec![Node::paragraph("ab"), Node::horizontal_rule()]);

        assert_eq!(child_index_at(&doc, 0).unwrap(), 0);
        assert_eq!(child_index_at(&doc, 4).unwrap(), 1);
        assert_eq!(child_index_at(&doc, 5).unwrap(), 2);
        assert!(child_index_at(&doc, 2).is_err());
    }

    #[test]
    fn test_document_error_conversion() {
        let err: MutationError = DocumentError::PositionOutOfRange { pos: 9, size: 2 }.into();
        assert_eq!(err, MutationError::PositionOutOfRange { pos: 9, size: 2 });
    }
}
