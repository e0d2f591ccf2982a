//! Slash trigger detection.
//!
//! A trigger is a `/` that starts its textblock or follows whitespace,
//! followed by non-whitespace up to the cursor: `Intro /tab|` yields the
//! range covering `/tab` and the query `tab`.

use blockpad_document::{Document, NodeKind};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashTrigger {
    /// Positions covering the slash and the query
    pub range: Range<usize>,

    /// Text typed after the slash
    pub query: String,
}

/// Find the trigger ending at `cursor`
pub fn detect(document: &Document, cursor: usize) -> Option<SlashTrigger> {
    let resolved = document.resolve(cursor).ok()?;
    let block = document.node_at_path(&resolved.path)?;
    if !block.kind.is_textblock() {
        return None;
    }

    let before: Vec<char> = block
        .content
        .iter()
        .flat_map(|node| match node.kind {
            NodeKind::Text => node.text.as_deref().unwrap_or_default().chars().collect(),
            _ => vec!['\n'],
        })
        .take(resolved.offset)
        .collect();

    let slash = before.iter().rposition(|&ch| ch == '/' || ch.is_whitespace())?;
    if before[slash] != '/' {
        return None;
    }
    if slash > 0 && !before[slash - 1].is_whitespace() {
        return None;
    }

    let start = resolved.content_start() + slash;
    Some(SlashTrigger {
        range: start..cursor,
        query: before[slash + 1..].iter().collect(),
    })
}
