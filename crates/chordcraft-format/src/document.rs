//! In-memory representation of one ChordCraft Code document.

use serde::{Deserialize, Serialize};

use crate::metadata::SongMetadata;
use crate::notes::{LineDiagnostic, NoteEvent};
use crate::payload::PayloadMetadata;

/// A reassembled lossless payload: descriptor plus verified raw bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LosslessPayload {
    pub metadata: PayloadMetadata,
    /// Raw codec bytes, already digest-verified.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// A neural token payload: model identifier plus the token sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralPayload {
    /// Backend model identifier (e.g. `facebook/encodec_24khz`).
    pub model: String,
    /// Source samples per token, as reported by the encoder.
    pub compression_ratio: f64,
    pub tokens: Vec<i64>,
}

/// Everything a parsed document carries.
///
/// A document always has metadata (possibly all defaults) and may carry any
/// combination of note events, a lossless payload, and a neural payload.
#[derive(Debug, Clone, Default)]
pub struct ChordCraftDocument {
    pub metadata: SongMetadata,
    pub notes: Vec<NoteEvent>,
    /// Recovered diagnostics from malformed `PLAY` lines, with line numbers
    /// relative to the whole document text.
    pub note_diagnostics: Vec<LineDiagnostic>,
    pub lossless: Option<LosslessPayload>,
    pub neural: Option<NeuralPayload>,
}

impl ChordCraftDocument {
    /// True when the document carries neither payload nor note events.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.lossless.is_none() && self.neural.is_none()
    }
}
