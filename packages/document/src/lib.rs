//! # Blockpad Document
//!
//! Minimal block document model consumed by the editor session layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ node: typed block/inline tree (JSON shape)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ position: flat positions → tree paths       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: validated root + mutations        │
//! │  - Empty detection                          │
//! │  - Atomic mutation batches                  │
//! │  - Load/save as JSON                        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Positions
//!
//! Text counts one position per character, leaf nodes (images, rules,
//! hard breaks) count one, and every other node adds an opening and a
//! closing token around its content. The root contributes no tokens, so
//! position 0 sits before the first block.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockpad_document::{Document, Mutation, Node};
//!
//! let mut doc = Document::empty();
//! doc.apply(&Mutation::InsertText { pos: 1, text: "Hello".into() })?;
//! doc.apply(&Mutation::InsertBlock { pos: 7, node: Node::horizontal_rule() })?;
//! ```

mod document;
mod errors;
mod mutations;
mod node;
mod position;

pub use document::Document;
pub use errors::DocumentError;
pub use mutations::{Mutation, MutationError};
pub use node::{Attrs, Node, NodeKind};
pub use position::{node_at_path, resolve, ResolvedPos};
