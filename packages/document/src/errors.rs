//! Error types for the document model

use crate::NodeKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Expected a doc node at the root, found {0}")]
    NotADocument(NodeKind),

    #[error("Position {pos} is outside the document (size {size})")]
    PositionOutOfRange { pos: usize, size: usize },
}
