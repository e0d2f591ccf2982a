//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] blockpad_document::DocumentError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] blockpad_document::MutationError),

    #[error("Invalid content seed: {0}")]
    Seed(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Selection {anchor}..{head} is outside the document (size {size})")]
    SelectionOutOfRange {
        anchor: usize,
        head: usize,
        size: usize,
    },
}
