//! End-to-end encode/decode pipeline.
//!
//! [`encode`] takes raw audio plus an [`EncodeRequest`] and produces
//! document text; [`decode`] parses text back into a document; the
//! `extract_*` helpers turn a parsed document's payloads back into audio.

use chordcraft_format::{
    frame, ChordCraftDocument, DocumentWriter, NeuralPayload, NoteEvent, SongMetadata,
    DEFAULT_CHUNK_SIZE, LOSSLESS_FORMAT_TAG,
};

use crate::error::{CodecError, Result};
use crate::flac;
use crate::neural::{NeuralRegistry, DEFAULT_NEURAL_MODEL};
use crate::normalize::normalize;
use crate::stream::AudioStream;

/// Sample rate lossless payloads are normalized to before encoding.
pub const LOSSLESS_SAMPLE_RATE: u32 = 44_100;

/// What to embed when encoding a document.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub metadata: SongMetadata,
    pub notes: Vec<NoteEvent>,
    pub include_lossless: bool,
    pub include_neural: bool,
    /// Neural model to encode with; ignored unless `include_neural`.
    pub model_id: String,
    pub chunk_size: usize,
}

impl Default for EncodeRequest {
    fn default() -> Self {
        Self {
            metadata: SongMetadata::default(),
            notes: Vec::new(),
            include_lossless: true,
            include_neural: false,
            model_id: DEFAULT_NEURAL_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Encode `input` into document text per `request`.
///
/// The input is normalized separately for each payload: 44.1 kHz stereo for
/// the lossless path, and the backend's native mono rate for the neural
/// path. Requesting no payloads and supplying no notes fails with
/// [`chordcraft_format::FormatError::NoPayloadRequested`].
pub fn encode(
    input: &AudioStream,
    request: &EncodeRequest,
    registry: &NeuralRegistry,
) -> Result<String> {
    tracing::info!(
        frames = input.frames(),
        lossless = request.include_lossless,
        neural = request.include_neural,
        "Encoding document"
    );
    let mut writer = DocumentWriter::new(request.metadata.clone());
    writer.add_notes(request.notes.iter().cloned());

    if request.include_lossless {
        let normalized = normalize(input, LOSSLESS_SAMPLE_RATE, true)?;
        let (bytes, meta) = flac::encode_lossless(&normalized, request.chunk_size)?;
        let chunks = frame(&bytes, request.chunk_size).map_err(CodecError::Format)?;
        writer.set_lossless(meta, chunks).map_err(CodecError::Format)?;
    }

    if request.include_neural {
        let backend = registry.get(&request.model_id)?;
        let normalized = normalize(input, backend.sample_rate(), false)?;
        let tokens = backend.encode_tokens(&normalized)?;
        let compression_ratio = normalized.frames() as f64 / tokens.len() as f64;
        writer.set_neural(NeuralPayload {
            model: backend.model_id().to_string(),
            compression_ratio,
            tokens,
        });
    }

    writer.finalize().map_err(CodecError::Format)
}

/// Parse document text, reassembling and verifying any payloads.
pub fn decode(text: &str) -> Result<ChordCraftDocument> {
    chordcraft_format::parse_document(text).map_err(CodecError::Format)
}

/// Decode a document's lossless payload back into audio.
///
/// Fails with [`CodecError::UnavailableCodec`] when the payload's format
/// tag names a codec this build cannot decode.
pub fn extract_lossless(doc: &ChordCraftDocument) -> Result<AudioStream> {
    let payload = doc
        .lossless
        .as_ref()
        .ok_or_else(|| CodecError::DecodingError("document has no lossless payload".to_string()))?;
    if payload.metadata.format != LOSSLESS_FORMAT_TAG {
        return Err(CodecError::UnavailableCodec {
            requested: payload.metadata.format.clone(),
        });
    }
    flac::decode_lossless(&payload.bytes)
}

/// Decode a document's neural payload back into audio through `registry`.
pub fn extract_neural(doc: &ChordCraftDocument, registry: &NeuralRegistry) -> Result<AudioStream> {
    let payload = doc
        .neural
        .as_ref()
        .ok_or_else(|| CodecError::DecodingError("document has no neural payload".to_string()))?;
    let backend = registry.get(&payload.model)?;
    backend.decode_tokens(&payload.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordcraft_format::{FormatError, PayloadMetadata};

    /// 16-bit aligned stereo sine at the lossless rate, so the full
    /// pipeline round-trips exactly.
    fn aligned_stereo(frames: usize) -> AudioStream {
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let raw = (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44_100.0).sin() * 0.5;
            let quantized = (raw * 32_767.0).round() / 32_767.0;
            samples.push(quantized);
            samples.push(quantized);
        }
        AudioStream::new(samples, LOSSLESS_SAMPLE_RATE, 2).unwrap()
    }

    #[test]
    fn test_lossless_round_trip() {
        let input = aligned_stereo(4096);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            metadata: SongMetadata::new(128, "C major"),
            ..Default::default()
        };

        let text = encode(&input, &request, &registry).unwrap();
        let doc = decode(&text).unwrap();
        assert_eq!(doc.metadata.bpm, 128);

        let output = extract_lossless(&doc).unwrap();
        assert_eq!(output.sample_rate(), LOSSLESS_SAMPLE_RATE);
        assert_eq!(output.channels(), 2);
        assert_eq!(output.samples(), input.samples());
    }

    #[test]
    fn test_neural_round_trip() {
        let input = aligned_stereo(4800);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            include_lossless: false,
            include_neural: true,
            ..Default::default()
        };

        let text = encode(&input, &request, &registry).unwrap();
        let doc = decode(&text).unwrap();
        assert!(doc.lossless.is_none());
        let neural = doc.neural.as_ref().unwrap();
        assert_eq!(neural.model, DEFAULT_NEURAL_MODEL);
        assert!(neural.compression_ratio > 1.0);

        let output = extract_neural(&doc, &registry).unwrap();
        assert_eq!(output.sample_rate(), 24_000);
        assert_eq!(output.channels(), 1);
        assert!(output.frames() > 0);
    }

    #[test]
    fn test_both_payloads() {
        let input = aligned_stereo(4096);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            include_neural: true,
            ..Default::default()
        };

        let text = encode(&input, &request, &registry).unwrap();
        let doc = decode(&text).unwrap();
        assert!(doc.lossless.is_some());
        assert!(doc.neural.is_some());
        assert!(extract_lossless(&doc).is_ok());
        assert!(extract_neural(&doc, &registry).is_ok());
    }

    #[test]
    fn test_notes_survive_encode() {
        let input = aligned_stereo(1024);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            notes: vec![NoteEvent::new("C4", 0.0, 1.0), NoteEvent::new("E4", 0.0, 1.0)],
            ..Default::default()
        };
        let text = encode(&input, &request, &registry).unwrap();
        let doc = decode(&text).unwrap();
        assert_eq!(doc.notes.len(), 2);
    }

    #[test]
    fn test_nothing_requested_fails() {
        let input = aligned_stereo(1024);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            include_lossless: false,
            include_neural: false,
            ..Default::default()
        };
        let err = encode(&input, &request, &registry).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Format(FormatError::NoPayloadRequested)
        ));
    }

    #[test]
    fn test_unknown_model_fails_encode() {
        let input = aligned_stereo(1024);
        let registry = NeuralRegistry::with_default_backends();
        let request = EncodeRequest {
            include_lossless: false,
            include_neural: true,
            model_id: "acme/supercodec_48khz".to_string(),
            ..Default::default()
        };
        let err = encode(&input, &request, &registry).unwrap_err();
        assert!(matches!(err, CodecError::UnavailableCodec { .. }));
    }

    #[test]
    fn test_foreign_format_tag_fails_extract() {
        let bytes = b"opus-encoded bytes";
        let meta = PayloadMetadata::for_bytes("opus", 48_000, 2, bytes, 64).unwrap();
        let chunks = frame(bytes, 64).unwrap();
        let mut writer = DocumentWriter::new(SongMetadata::default());
        writer.set_lossless(meta, chunks).unwrap();
        let text = writer.finalize().unwrap();

        let doc = decode(&text).unwrap();
        let err = extract_lossless(&doc).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnavailableCodec { requested } if requested == "opus"
        ));
    }

    #[test]
    fn test_extract_from_notes_only_document() {
        let mut writer = DocumentWriter::new(SongMetadata::default());
        writer.add_note(NoteEvent::new("C4", 0.0, 1.0));
        let text = writer.finalize().unwrap();
        let doc = decode(&text).unwrap();
        assert!(extract_lossless(&doc).is_err());
        let registry = NeuralRegistry::with_default_backends();
        assert!(extract_neural(&doc, &registry).is_err());
    }
}
