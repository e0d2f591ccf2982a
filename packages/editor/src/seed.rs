//! # Content Seed
//!
//! Default structure applied to a blank document. A seed that fails to
//! parse or validate is a packaging defect, so every constructor reports
//! it as [`EditorError::Seed`] and session startup refuses to continue.

use crate::EditorError;
use blockpad_document::{Document, Node, NodeKind};
use std::path::Path;

/// Built-in seed document
pub const DEFAULT_SEED: &str = r#"{
  "type": "doc",
  "content": [
    {
      "type": "heading",
      "attrs": { "level": 1 },
      "content": [{ "type": "text", "text": "Welcome to Blockpad" }]
    },
    {
      "type": "paragraph",
      "content": [{ "type": "text", "text": "Type / to browse blocks, or just start writing." }]
    }
  ]
}"#;

#[derive(Debug, Clone, PartialEq)]
pub struct ContentSeed {
    root: Node,
}

impl ContentSeed {
    /// The seed shipped with the editor
    pub fn builtin() -> Result<Self, EditorError> {
        Self::from_json(DEFAULT_SEED)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let root: Node = serde_json::from_str(json).map_err(|e| EditorError::Seed(e.to_string()))?;
        Self::from_node(root)
    }

    /// Load a seed from a JSON file
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EditorError::Seed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_node(root: Node) -> Result<Self, EditorError> {
        if root.kind != NodeKind::Doc {
            return Err(EditorError::Seed(format!(
                "expected a doc node, found {}",
                root.kind
            )));
        }

        let document = Document::from_node(root).map_err(|e| EditorError::Seed(e.to_string()))?;
        if document.is_empty() {
            return Err(EditorError::Seed("seed content is empty".to_string()));
        }

        Ok(Self {
            root: document.root().clone(),
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_seed_is_valid() {
        let seed = ContentSeed::builtin().unwrap();
        let blocks = &seed.root().content;

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, NodeKind::Heading);
        assert_eq!(blocks[0].attr_u64("level"), Some(1));
        assert_eq!(blocks[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_malformed_seed_is_fatal() {
        let result = ContentSeed::from_json(r#"{ "type": "doc", "content": [ { "type": "heading" } ] }"#);
        assert!(matches!(result, Err(EditorError::Seed(_))));

        let result = ContentSeed::from_json("not json");
        assert!(matches!(result, Err(EditorError::Seed(_))));
    }

    #[test]
    fn test_empty_seed_is_rejected() {
        let result = ContentSeed::from_json(r#"{ "type": "doc", "content": [ { "type": "paragraph" } ] }"#);
        assert!(matches!(result, Err(EditorError::Seed(_))));
    }

    #[test]
    fn test_non_doc_seed_is_rejected() {
        let result = ContentSeed::from_node(Node::paragraph("hi"));
        assert!(matches!(result, Err(EditorError::Seed(_))));
    }

    #[test]
    fn test_load_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "type": "doc", "content": [ {{ "type": "paragraph", "content": [ {{ "type": "text", "text": "Notes" }} ] }} ] }}"#
        )
        .unwrap();

        let seed = ContentSeed::load(file.path()).unwrap();
        assert_eq!(seed.root().text_content(), "Notes");

        let missing = ContentSeed::load(Path::new("/nonexistent/seed.json"));
        assert!(matches!(missing, Err(EditorError::Seed(_))));
    }
}
