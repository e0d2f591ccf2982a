//! Flat position resolution.
//!
//! A position is resolved to the innermost node whose content holds it,
//! expressed as a path of child indices from the root plus an offset into
//! that node's content.

use crate::{DocumentError, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    /// Absolute position
    pub pos: usize,

    /// Child indices from the root down to the parent node
    pub path: Vec<usize>,

    /// Offset of `pos` within the parent's content
    pub offset: usize,
}

impl ResolvedPos {
    /// Depth of the parent node (0 = root)
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Absolute position where the parent's content starts
    pub fn content_start(&self) -> usize {
        self.pos - self.offset
    }
}

/// Resolve `pos` against the content of `root`
pub fn resolve(root: &Node, pos: usize) -> Result<ResolvedPos, DocumentError> {
    let size = root.content_size();
    if pos > size {
        return Err(DocumentError::PositionOutOfRange { pos, size });
    }

    let mut path = Vec::new();
    let mut node = root;
    let mut offset = pos;

    'descend: loop {
        let mut start = 0;
        for (index, child) in node.content.iter().enumerate() {
            if offset <= start {
                break;
            }
            let end = start + child.size();
            if offset < end {
                if child.kind.is_text() {
                    break;
                }
                path.push(index);
                offset -= start + 1;
                node = child;
                continue 'descend;
            }
            start = end;
        }
        break;
    }

    Ok(ResolvedPos { pos, path, offset })
}

/// Node reached by following `path` from `root`
pub fn node_at_path<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    path.iter()
        .try_fold(root, |node, &index| node.content.get(index))
}

pub(crate) fn node_at_path_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    path.iter()
        .try_fold(root, |node, &index| node.content.get_mut(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn sample() -> Node {
        // heading "Welcome" occupies 0..9, paragraph "/table" occupies 9..17
        Node::doc(vec![Node::heading(1, "Welcome"), Node::paragraph("/table")])
    }

    #[test]
    fn test_resolve_block_boundaries() {
        let root = sample();

        let start = resolve(&root, 0).unwrap();
        assert!(start.path.is_empty());
        assert_eq!(start.offset, 0);

        let between = resolve(&root, 9).unwrap();
        assert!(between.path.is_empty());
        assert_eq!(between.offset, 9);

        let end = resolve(&root, 17).unwrap();
        assert!(end.path.is_empty());
        assert_eq!(end.offset, 17);
    }

    #[test]
    fn test_resolve_inside_text() {
        let root = sample();

        let in_heading = resolve(&root, 4).unwrap();
        assert_eq!(in_heading.path, vec![0]);
        assert_eq!(in_heading.offset, 3);

        let trigger = resolve(&root, 10).unwrap();
        assert_eq!(trigger.path, vec![1]);
        assert_eq!(trigger.offset, 0);
        assert_eq!(trigger.content_start(), 10);

        let after_trigger = resolve(&root, 16).unwrap();
        assert_eq!(after_trigger.path, vec![1]);
        assert_eq!(after_trigger.offset, 6);
    }

    #[test]
    fn test_resolve_nested() {
        let root = Node::doc(vec![Node::new(NodeKind::BulletList).with_content(vec![
            Node::new(NodeKind::ListItem).with_content(vec![Node::paragraph("ab")]),
        ])]);

        // list opens at 0, item at 1, paragraph at 2, text starts at 3
        let resolved = resolve(&root, 4).unwrap();
        assert_eq!(resolved.path, vec![0, 0, 0]);
        assert_eq!(resolved.offset, 1);
        assert_eq!(resolved.depth(), 3);

        let in_item = resolve(&root, 2).unwrap();
        assert_eq!(in_item.path, vec![0, 0]);
        assert_eq!(in_item.offset, 0);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let root = sample();
        assert!(matches!(
            resolve(&root, 18),
            Err(DocumentError::PositionOutOfRange { pos: 18, size: 17 })
        ));
    }

    #[test]
    fn test_node_at_path() {
        let root = sample();

        assert_eq!(node_at_path(&root, &[]).map(|n| n.kind), Some(NodeKind::Doc));
        assert_eq!(
            node_at_path(&root, &[1]).map(|n| n.kind),
            Some(NodeKind::Paragraph)
        );
        assert!(node_at_path(&root, &[5]).is_none());
    }
}
