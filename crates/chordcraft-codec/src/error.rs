//! Error types for the ChordCraft codec crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unavailable codec: {requested}")]
    UnavailableCodec { requested: String },

    #[error("Invalid audio stream: {reason}")]
    InvalidStream { reason: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Format error: {0}")]
    Format(#[from] chordcraft_format::FormatError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
