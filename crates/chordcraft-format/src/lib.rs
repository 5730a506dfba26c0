//! # chordcraft-format
//!
//! The ChordCraft Code container format library. Handles building and
//! parsing `Song { ... }` documents including song metadata, `PLAY` note
//! statements, and chunked base64 payloads with SHA-256 integrity.
//!
//! ## Format Overview
//!
//! A document consists of:
//! - **meta**: tempo, key, and time signature on a single line
//! - **analysis**: the pipe-delimited chord skeleton
//! - **PLAY statements**: symbolic note events, one per line
//! - **audio**: a lossless payload descriptor followed by
//!   `<<PAYLOAD:FLAC:n>>` chunks of base64 text
//! - **neural**: a token payload descriptor followed by
//!   `<<NEURAL_TOKENS>>` and a JSON integer array
//!
//! ## Example
//! ```rust
//! use chordcraft_format::{parse_document, DocumentWriter, NoteEvent, SongMetadata};
//!
//! // Writing
//! let mut writer = DocumentWriter::new(SongMetadata::new(120, "C major"));
//! writer.add_note(NoteEvent::new("C4", 0.0, 1.0));
//! let text = writer.finalize().unwrap();
//!
//! // Reading
//! let doc = parse_document(&text).unwrap();
//! assert_eq!(doc.notes.len(), 1);
//! ```

pub mod document;
pub mod error;
pub mod framer;
pub mod metadata;
pub mod notes;
pub mod payload;
pub mod reader;
pub mod writer;

pub use document::{ChordCraftDocument, LosslessPayload, NeuralPayload};
pub use error::{FormatError, Result};
pub use framer::{frame, unframe, Chunk, DEFAULT_CHUNK_SIZE};
pub use metadata::{SongMetadata, TimeSignature, DEFAULT_BPM, DEFAULT_KEY};
pub use notes::{LineDiagnostic, NoteEvent, ParseOutcome, DEFAULT_VELOCITY};
pub use payload::{
    sha256_hex, PayloadMetadata, LOSSLESS_FORMAT_TAG, NEURAL_FORMAT_TAG,
};
pub use reader::parse_document;
pub use writer::DocumentWriter;
