//! # Document Handle
//!
//! Validated `doc` root plus a version counter.
//!
//! Every change goes through [`Document::apply_all`] or
//! [`Document::set_content`]: mutations run against a copy of the tree,
//! the result is normalized and validated, and only then swapped in. A
//! failed batch leaves the document untouched.

use crate::position::{node_at_path, resolve};
use crate::{DocumentError, Mutation, MutationError, Node, NodeKind, ResolvedPos};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Increments on every successful change
    pub version: u64,

    root: Node,
}

impl Document {
    /// Blank document: a single empty paragraph
    pub fn empty() -> Self {
        Self {
            version: 0,
            root: Node::doc(vec![Node::new(NodeKind::Paragraph)]),
        }
    }

    /// Wrap an existing `doc` node
    pub fn from_node(mut root: Node) -> Result<Self, DocumentError> {
        if root.kind != NodeKind::Doc {
            return Err(DocumentError::NotADocument(root.kind));
        }
        root.normalize();
        root.validate()?;

        Ok(Self { version: 0, root })
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let root: Node = serde_json::from_str(json)?;
        Self::from_node(root)
    }

    /// Load a document from a JSON file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level blocks
    pub fn blocks(&self) -> &[Node] {
        &self.root.content
    }

    /// No blocks, or a single paragraph without content
    pub fn is_empty(&self) -> bool {
        match self.root.content.as_slice() {
            [] => true,
            [only] => only.kind == NodeKind::Paragraph && only.content.is_empty(),
            _ => false,
        }
    }

    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, DocumentError> {
        resolve(&self.root, pos)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<&Node> {
        node_at_path(&self.root, path)
    }

    /// Top-level block covering `pos`, with the position it starts at
    pub fn block_at(&self, pos: usize) -> Option<(usize, &Node)> {
        let mut start = 0;
        for block in &self.root.content {
            let end = start + block.size();
            if start <= pos && pos < end {
                return Some((start, block));
            }
            start = end;
        }
        None
    }

    /// First position at or after `from` that lies inside a textblock
    pub fn next_text_position(&self, from: usize) -> Option<usize> {
        (from..=self.content_size()).find(|&pos| {
            self.resolve(pos)
                .ok()
                .and_then(|resolved| self.node_at_path(&resolved.path))
                .is_some_and(|node| node.kind.is_textblock())
        })
    }

    /// Where a cursor lands when focusing the document start
    pub fn start_position(&self) -> usize {
        self.next_text_position(0).unwrap_or(0)
    }

    /// Text between two positions; hard breaks read as newlines
    pub fn text_between(&self, from: usize, to: usize) -> Result<String, DocumentError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(DocumentError::PositionOutOfRange {
                pos: to.max(from),
                size,
            });
        }

        let mut out = String::new();
        collect_text_between(&self.root, 0, from, to, &mut out);
        Ok(out)
    }

    /// Replace the whole tree
    pub fn set_content(&mut self, root: Node) -> Result<u64, DocumentError> {
        let next = Self::from_node(root)?;
        self.root = next.root;
        self.version += 1;

        debug!(version = self.version, blocks = self.root.content.len(), "Document content replaced");
        Ok(self.version)
    }

    /// Apply a single mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<u64, MutationError> {
        self.apply_all(std::slice::from_ref(mutation))
    }

    /// Apply mutations as one atomic step
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<u64, MutationError> {
        let mut next = self.root.clone();
        for mutation in mutations {
            mutation.apply_to(&mut next)?;
        }
        next.normalize();
        next.validate()
            .map_err(|e| MutationError::InvalidStructure(e.to_string()))?;

        self.root = next;
        self.version += 1;

        debug!(
            version = self.version,
            mutations = ?mutations.iter().map(Mutation::name).collect::<Vec<_>>(),
            "Applied mutations"
        );
        Ok(self.version)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

fn collect_text_between(node: &Node, content_start: usize, from: usize, to: usize, out: &mut String) {
    let mut start = content_start;
    for child in &node.content {
        let end = start + child.size();
        if end <= from {
            start = end;
            continue;
        }
        if start >= to {
            break;
        }

        match child.kind {
            NodeKind::Text => {
                let skip = from.saturating_sub(start);
                let take = to.min(end) - start.max(from);
                if let Some(text) = &child.text {
                    out.extend(text.chars().skip(skip).take(take));
                }
            }
            NodeKind::HardBreak => out.push('\n'),
            kind if kind.is_leaf() => {}
            _ => collect_text_between(child, start + 1, from, to, out),
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_node(Node::doc(vec![
            Node::heading(1, "Welcome"),
            Node::paragraph("/table"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert!(doc.is_empty());
        assert_eq!(doc.version, 0);
        assert_eq!(doc.content_size(), 2);
        assert_eq!(doc.start_position(), 1);
    }

    #[test]
    fn test_is_empty_variants() {
        let bare = Document::from_node(Node::doc(vec![])).unwrap();
        assert!(bare.is_empty());

        let heading = Document::from_node(Node::doc(vec![Node::new(NodeKind::Heading)
            .with_attr("level", 1)]))
        .unwrap();
        assert!(!heading.is_empty());

        let two = Document::from_node(Node::doc(vec![
            Node::paragraph(""),
            Node::paragraph(""),
        ]))
        .unwrap();
        assert!(!two.is_empty());

        assert!(!sample().is_empty());
    }

    #[test]
    fn test_from_node_rejects_non_doc() {
        let result = Document::from_node(Node::paragraph("x"));
        assert!(matches!(
            result,
            Err(DocumentError::NotADocument(NodeKind::Paragraph))
        ));
    }

    #[test]
    fn test_text_between() {
        let doc = sample();
        assert_eq!(doc.text_between(10, 16).unwrap(), "/table");
        assert_eq!(doc.text_between(1, 4).unwrap(), "Wel");
        assert_eq!(doc.text_between(0, 17).unwrap(), "Welcome/table");
        assert!(doc.text_between(5, 40).is_err());
    }

    #[test]
    fn test_block_at() {
        let doc = sample();

        let (start, block) = doc.block_at(10).unwrap();
        assert_eq!(start, 9);
        assert_eq!(block.kind, NodeKind::Paragraph);

        assert_eq!(doc.block_at(0).map(|(_, b)| b.kind), Some(NodeKind::Heading));
        assert!(doc.block_at(17).is_none());
    }

    #[test]
    fn test_failed_batch_leaves_document_untouched() {
        let mut doc = sample();
        let before = doc.clone();

        let result = doc.apply_all(&[
            Mutation::DeleteRange { from: 10, to: 16 },
            Mutation::InsertText { pos: 0, text: "x".to_string() },
        ]);

        assert!(matches!(result, Err(MutationError::NotInTextblock(0))));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_content_bumps_version() {
        let mut doc = Document::empty();
        let version = doc.set_content(sample().root().clone()).unwrap();

        assert_eq!(version, 1);
        assert_eq!(doc.blocks().len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        sample().save(&path).unwrap();
        let loaded = Document::load(&path).unwrap();

        assert_eq!(loaded.root(), sample().root());
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"heading\""));
    }
}
