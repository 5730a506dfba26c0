//! Document writer: assembles a complete ChordCraft Code text.
//!
//! The writer is a builder: construct with [`DocumentWriter::new`], attach
//! note events and payloads, then call [`DocumentWriter::finalize`] to emit
//! the document text. Emission order is fixed: meta line, analysis block,
//! note statements, lossless descriptor and chunks, neural descriptor and
//! tokens, closing brace.

use crate::document::NeuralPayload;
use crate::error::{FormatError, Result};
use crate::framer::Chunk;
use crate::metadata::SongMetadata;
use crate::notes::{self, NoteEvent};
use crate::payload::PayloadMetadata;

/// Builder for one document.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    metadata: SongMetadata,
    version: Option<String>,
    notes: Vec<NoteEvent>,
    lossless: Option<(PayloadMetadata, Vec<Chunk>)>,
    neural: Option<NeuralPayload>,
}

impl DocumentWriter {
    pub fn new(metadata: SongMetadata) -> Self {
        Self {
            metadata,
            version: None,
            notes: Vec::new(),
            lossless: None,
            neural: None,
        }
    }

    /// Stamp a `version` field into the meta line. Readers that do not know
    /// the field ignore it.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn add_note(&mut self, event: NoteEvent) -> &mut Self {
        self.notes.push(event);
        self
    }

    pub fn add_notes(&mut self, events: impl IntoIterator<Item = NoteEvent>) -> &mut Self {
        self.notes.extend(events);
        self
    }

    /// Attach a framed lossless payload.
    ///
    /// The chunk list must match the descriptor's `chunk_count`.
    pub fn set_lossless(
        &mut self,
        metadata: PayloadMetadata,
        chunks: Vec<Chunk>,
    ) -> Result<&mut Self> {
        if chunks.len() != metadata.chunk_count {
            return Err(FormatError::MissingChunk {
                expected: metadata.chunk_count,
                found: chunks.len(),
            });
        }
        self.lossless = Some((metadata, chunks));
        Ok(self)
    }

    pub fn set_neural(&mut self, payload: NeuralPayload) -> &mut Self {
        self.neural = Some(payload);
        self
    }

    /// Emit the document text.
    ///
    /// Fails with [`FormatError::NoPayloadRequested`] when the builder holds
    /// neither a payload nor any note events; such a document would carry no
    /// content at all.
    pub fn finalize(&self) -> Result<String> {
        if self.notes.is_empty() && self.lossless.is_none() && self.neural.is_none() {
            return Err(FormatError::NoPayloadRequested);
        }

        let mut lines: Vec<String> = Vec::new();
        lines.push("Song {".to_string());
        let version = match &self.version {
            Some(v) => format!(", version: \"{v}\""),
            None => String::new(),
        };
        lines.push(format!(
            "  meta: {{ bpm: {}, key: \"{}\", time: \"{}\"{version} }}",
            self.metadata.bpm, self.metadata.key, self.metadata.time,
        ));
        lines.push("  analysis: {".to_string());
        lines.push(format!("    chords: {}", self.metadata.chords_line()));
        lines.push("  }".to_string());

        if !self.notes.is_empty() {
            for statement in notes::render(&self.notes).lines() {
                lines.push(format!("  {statement}"));
            }
        }

        if let Some((meta, chunks)) = &self.lossless {
            tracing::debug!(
                chunks = meta.chunk_count,
                chunk_size = meta.chunk_size,
                sha256 = %meta.sha256,
                "Writing lossless payload"
            );
            lines.push("  audio: {".to_string());
            lines.push(format!(
                "    format: \"{}\", sr: {}, channels: {},",
                meta.format, meta.sample_rate, meta.channels,
            ));
            lines.push(format!(
                "    sha256: \"{}\", chunks: {}, chunk_size: {}",
                meta.sha256, meta.chunk_count, meta.chunk_size,
            ));
            lines.push("  }".to_string());
            lines.push(String::new());
            // Wire markers are 1-based; chunk sequences are 0-based.
            for chunk in chunks {
                lines.push(format!("<<PAYLOAD:FLAC:{}>>", chunk.sequence + 1));
                lines.push(chunk.text.clone());
            }
        }

        if let Some(neural) = &self.neural {
            tracing::debug!(
                model = %neural.model,
                tokens = neural.tokens.len(),
                "Writing neural payload"
            );
            lines.push(String::new());
            lines.push("  neural: {".to_string());
            lines.push(format!(
                "    format: \"neural_codec\", model: \"{}\",",
                neural.model,
            ));
            lines.push(format!(
                "    tokens: {}, compression_ratio: {:.2}",
                neural.tokens.len(),
                neural.compression_ratio,
            ));
            lines.push("  }".to_string());
            lines.push(String::new());
            lines.push("<<NEURAL_TOKENS>>".to_string());
            lines.push(serde_json::to_string(&neural.tokens)?);
        }

        lines.push("}".to_string());
        tracing::info!(
            notes = self.notes.len(),
            lossless = self.lossless.is_some(),
            neural = self.neural.is_some(),
            "Finalized document"
        );
        Ok(lines.join("\n"))
    }
}
