//! Error types for the ChordCraft format crate.

use thiserror::Error;

/// Errors that can occur when building or parsing ChordCraft documents.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("Payload digest mismatch: expected {expected}, got {actual}")]
    IntegrityError { expected: String, actual: String },

    #[error("Missing chunk: expected chunk {expected}, found {found}")]
    MissingChunk { expected: usize, found: usize },

    #[error("Trailing garbage in payload: expected {expected}, got {actual}")]
    TrailingGarbage { expected: u64, actual: u64 },

    #[error("Invalid chunk size: {got} (must be at least 1)")]
    InvalidChunkSize { got: usize },

    #[error("Chunk count exceeded maximum (max {max}, got {got})")]
    ChunkCountExceeded { max: usize, got: usize },

    #[error("No payload requested and no note events present")]
    NoPayloadRequested,

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
