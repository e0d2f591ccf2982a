//! Tests for document mutations

use blockpad_document::{Attrs, Document, Mutation, MutationError, Node, NodeKind};
use serde_json::json;

fn doc_of(blocks: Vec<Node>) -> Document {
    Document::from_node(Node::doc(blocks)).unwrap()
}

#[test]
fn test_insert_text_into_empty_paragraph() {
    let mut doc = Document::empty();

    doc.apply(&Mutation::InsertText {
        pos: 1,
        text: "Hello".to_string(),
    })
    .unwrap();

    assert_eq!(doc.blocks()[0].text_content(), "Hello");
    assert_eq!(doc.version, 1);
    assert!(!doc.is_empty());
}

#[test]
fn test_insert_text_mid_word_merges_nodes() {
    let mut doc = doc_of(vec![Node::paragraph("Helo")]);

    doc.apply(&Mutation::InsertText {
        pos: 4,
        text: "l".to_string(),
    })
    .unwrap();

    let paragraph = &doc.blocks()[0];
    assert_eq!(paragraph.content.len(), 1);
    assert_eq!(paragraph.text_content(), "Hello");
}

#[test]
fn test_delete_range_within_textblock() {
    let mut doc = doc_of(vec![Node::paragraph("Hello /table world")]);

    // paragraph content starts at 1; "/table" covers 7..13
    doc.apply(&Mutation::DeleteRange { from: 7, to: 13 }).unwrap();

    assert_eq!(doc.blocks()[0].text_content(), "Hello  world");
}

#[test]
fn test_delete_range_across_blocks_fails() {
    let mut doc = doc_of(vec![Node::paragraph("one"), Node::paragraph("two")]);

    let result = doc.apply(&Mutation::DeleteRange { from: 2, to: 7 });

    assert_eq!(result, Err(MutationError::RangeSpansBlocks { from: 2, to: 7 }));
    assert_eq!(doc.version, 0);
}

#[test]
fn test_delete_range_rejects_reversed_range() {
    let mut doc = doc_of(vec![Node::paragraph("abc")]);

    let result = doc.apply(&Mutation::DeleteRange { from: 3, to: 1 });

    assert_eq!(result, Err(MutationError::InvalidRange { from: 3, to: 1 }));
}

#[test]
fn test_set_block_type_to_heading() {
    let mut doc = doc_of(vec![Node::paragraph("Title")]);

    let mut attrs = Attrs::new();
    attrs.insert("level".to_string(), json!(2));
    doc.apply(&Mutation::SetBlockType {
        pos: 3,
        kind: NodeKind::Heading,
        attrs,
    })
    .unwrap();

    let block = &doc.blocks()[0];
    assert_eq!(block.kind, NodeKind::Heading);
    assert_eq!(block.attr_u64("level"), Some(2));
    assert_eq!(block.text_content(), "Title");
}

#[test]
fn test_set_block_type_rejects_invalid_heading() {
    let mut doc = doc_of(vec![Node::paragraph("Title")]);

    let result = doc.apply(&Mutation::SetBlockType {
        pos: 1,
        kind: NodeKind::Heading,
        attrs: Attrs::new(),
    });

    assert!(matches!(result, Err(MutationError::InvalidStructure(_))));
    assert_eq!(doc.blocks()[0].kind, NodeKind::Paragraph);
}

#[test]
fn test_toggle_list_wraps_then_lifts() {
    let mut doc = doc_of(vec![Node::paragraph("item")]);

    doc.apply(&Mutation::ToggleList {
        pos: 1,
        kind: NodeKind::BulletList,
    })
    .unwrap();

    let list = &doc.blocks()[0];
    assert_eq!(list.kind, NodeKind::BulletList);
    assert_eq!(list.content[0].kind, NodeKind::ListItem);
    assert_eq!(list.text_content(), "item");

    // list opens at 0, item at 1, paragraph content starts at 3
    doc.apply(&Mutation::ToggleList {
        pos: 3,
        kind: NodeKind::BulletList,
    })
    .unwrap();

    assert_eq!(doc.blocks().len(), 1);
    assert_eq!(doc.blocks()[0].kind, NodeKind::Paragraph);
}

#[test]
fn test_toggle_list_converts_between_kinds() {
    let mut doc = doc_of(vec![Node::paragraph("todo")]);

    doc.apply(&Mutation::ToggleList {
        pos: 1,
        kind: NodeKind::OrderedList,
    })
    .unwrap();
    doc.apply(&Mutation::ToggleList {
        pos: 3,
        kind: NodeKind::TaskList,
    })
    .unwrap();

    let list = &doc.blocks()[0];
    assert_eq!(list.kind, NodeKind::TaskList);
    assert_eq!(list.content[0].kind, NodeKind::TaskItem);
    assert_eq!(list.content[0].attrs.get("checked"), Some(&json!(false)));
}

#[test]
fn test_wrap_in_blockquote() {
    let mut doc = doc_of(vec![Node::paragraph("quoted")]);

    doc.apply(&Mutation::Wrap {
        pos: 1,
        kind: NodeKind::Blockquote,
    })
    .unwrap();

    assert_eq!(doc.blocks()[0].kind, NodeKind::Blockquote);
    assert_eq!(doc.blocks()[0].text_content(), "quoted");

    let result = doc.apply(&Mutation::Wrap {
        pos: 2,
        kind: NodeKind::Table,
    });
    assert_eq!(result, Err(MutationError::UnsupportedKind(NodeKind::Table)));
}

#[test]
fn test_insert_block_replaces_empty_paragraph() {
    let mut doc = Document::empty();

    doc.apply(&Mutation::InsertBlock {
        pos: 1,
        node: Node::table(3, 3, true),
    })
    .unwrap();

    assert_eq!(doc.blocks().len(), 1);
    assert_eq!(doc.blocks()[0].kind, NodeKind::Table);
}

#[test]
fn test_insert_block_splits_textblock() {
    let mut doc = doc_of(vec![Node::paragraph("before after")]);

    // content starts at 1; split after "before "
    doc.apply(&Mutation::InsertBlock {
        pos: 8,
        node: Node::horizontal_rule(),
    })
    .unwrap();

    let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Paragraph, NodeKind::HorizontalRule, NodeKind::Paragraph]
    );
    assert_eq!(doc.blocks()[0].text_content(), "before ");
    assert_eq!(doc.blocks()[2].text_content(), "after");
}

#[test]
fn test_insert_block_at_textblock_edges() {
    let mut doc = doc_of(vec![Node::paragraph("text")]);

    doc.apply(&Mutation::InsertBlock {
        pos: 5,
        node: Node::image(None),
    })
    .unwrap();
    doc.apply(&Mutation::InsertBlock {
        pos: 1,
        node: Node::horizontal_rule(),
    })
    .unwrap();

    let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::HorizontalRule, NodeKind::Paragraph, NodeKind::Image]
    );
}

#[test]
fn test_insert_block_between_blocks() {
    let mut doc = doc_of(vec![Node::paragraph("a"), Node::paragraph("b")]);

    doc.apply(&Mutation::InsertBlock {
        pos: 3,
        node: Node::horizontal_rule(),
    })
    .unwrap();

    assert_eq!(doc.blocks()[1].kind, NodeKind::HorizontalRule);
    assert_eq!(doc.blocks().len(), 3);
}

#[test]
fn test_insert_inline_node_as_block_fails() {
    let mut doc = Document::empty();

    let result = doc.apply(&Mutation::InsertBlock {
        pos: 1,
        node: Node::text("nope"),
    });

    assert_eq!(result, Err(MutationError::UnsupportedKind(NodeKind::Text)));
}

#[test]
fn test_position_out_of_range() {
    let mut doc = Document::empty();

    let result = doc.apply(&Mutation::InsertText {
        pos: 40,
        text: "x".to_string(),
    });

    assert_eq!(
        result,
        Err(MutationError::PositionOutOfRange { pos: 40, size: 2 })
    );
}
