//! Document reader — parses ChordCraft Code text back into a
//! [`ChordCraftDocument`].
//!
//! The reader validates the `Song { ... }` envelope, parses the metadata and
//! payload descriptor blocks, reassembles chunked payloads, and verifies the
//! SHA-256 digest before exposing the data through a safe API.
//!
//! # Example
//!
//! ```rust,no_run
//! use chordcraft_format::parse_document;
//!
//! let text = std::fs::read_to_string("track.ccc").unwrap();
//! let doc = parse_document(&text).unwrap();
//! println!("bpm: {}", doc.metadata.bpm);
//! println!("notes: {}", doc.notes.len());
//! ```

use crate::document::{ChordCraftDocument, LosslessPayload, NeuralPayload};
use crate::error::{FormatError, Result};
use crate::framer::{self, Chunk, DEFAULT_CHUNK_SIZE};
use crate::metadata::{SongMetadata, TimeSignature};
use crate::notes;
use crate::payload::{PayloadMetadata, LOSSLESS_FORMAT_TAG};

/// Maximum number of payload chunks allowed per document (security limit).
const MAX_CHUNK_COUNT: usize = 16_384;

/// Maximum declared chunk size in characters (16 MiB security limit).
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Marker prefix for lossless payload chunks. The trailing number is the
/// 1-based chunk index.
const PAYLOAD_MARKER_PREFIX: &str = "<<PAYLOAD:FLAC:";

/// Marker preceding the neural token array line.
const NEURAL_MARKER: &str = "<<NEURAL_TOKENS>>";

/// Parse a complete document from text.
///
/// This performs the following steps:
/// 1. Validates the `Song {` envelope and closing brace.
/// 2. Parses the `meta:` block; missing or malformed fields fall back to
///    their documented defaults.
/// 3. Parses the `analysis:` block chord skeleton.
/// 4. Scans for `PLAY` note statements ahead of the first payload marker,
///    recovering per-line diagnostics for malformed statements.
/// 5. Parses the `audio:` descriptor, collects payload chunks, reassembles
///    them, and verifies the SHA-256 digest.
/// 6. Parses the `neural:` descriptor and token array, if present.
///
/// # Errors
///
/// Returns [`FormatError`] if the envelope is broken, a payload descriptor
/// is incomplete, chunks are missing or misshapen, or the reassembled
/// payload fails digest verification. Malformed `PLAY` lines never fail the
/// parse; they are recovered into
/// [`ChordCraftDocument::note_diagnostics`].
pub fn parse_document(text: &str) -> Result<ChordCraftDocument> {
    let lines: Vec<&str> = text.lines().collect();

    // --- 1. Validate the envelope ---
    check_envelope(&lines)?;

    // --- 2. Song metadata ---
    let mut metadata = parse_song_metadata(&lines);

    // --- 3. Chord skeleton ---
    if let Some(body) = extract_block(&lines, "analysis")? {
        if let Some((_, rest)) = body.split_once("chords:") {
            metadata.chords = SongMetadata::parse_chords_line(rest.trim());
        }
    }
    tracing::info!(
        bpm = metadata.bpm,
        key = %metadata.key,
        time = %metadata.time,
        chords = metadata.chords.len(),
        "Parsed song metadata"
    );

    // --- 4. Note statements ---
    // Only the region ahead of the first payload marker is scanned, so
    // base64 text can never be misread as a statement.
    let marker_start = lines
        .iter()
        .position(|l| l.trim_start().starts_with("<<"))
        .unwrap_or(lines.len());
    let note_region = lines[..marker_start].join("\n");
    let outcome = notes::parse(&note_region);
    tracing::debug!(
        events = outcome.events.len(),
        diagnostics = outcome.diagnostics.len(),
        "Scanned note statements"
    );

    // --- 5. Lossless payload ---
    let lossless = parse_lossless(&lines)?;

    // --- 6. Neural payload ---
    let neural = parse_neural(&lines)?;

    Ok(ChordCraftDocument {
        metadata,
        notes: outcome.events,
        note_diagnostics: outcome.diagnostics,
        lossless,
        neural,
    })
}

/// Require the `Song {` opening line and the closing `}`.
fn check_envelope(lines: &[&str]) -> Result<()> {
    let first = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "document is empty".to_string(),
        })?;
    if first != "Song {" {
        return Err(FormatError::MalformedDocument {
            reason: format!("expected document to open with 'Song {{', got '{first}'"),
        });
    }
    let last = lines
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "document is empty".to_string(),
        })?;
    if last != "}" {
        return Err(FormatError::MalformedDocument {
            reason: "document does not end with a closing '}'".to_string(),
        });
    }
    Ok(())
}

/// Parse the `meta:` block into [`SongMetadata`] (chords filled in later).
///
/// A missing block or malformed field falls back to defaults; documents are
/// allowed to carry only payloads. Unknown fields are ignored.
fn parse_song_metadata(lines: &[&str]) -> SongMetadata {
    let mut metadata = SongMetadata::default();
    let body = match extract_block(lines, "meta") {
        Ok(Some(body)) => body,
        _ => {
            tracing::warn!("Document has no meta block, using defaults");
            return metadata;
        }
    };
    let fields = parse_fields(&body);

    if let Some(raw) = field(&fields, "bpm") {
        match raw.parse::<u32>() {
            Ok(bpm) if bpm > 0 => metadata.bpm = bpm,
            _ => tracing::warn!(raw, "Ignoring malformed bpm field"),
        }
    }
    if let Some(key) = field(&fields, "key") {
        if !key.is_empty() {
            metadata.key = key.to_string();
        }
    }
    if let Some(raw) = field(&fields, "time") {
        match raw.parse::<TimeSignature>() {
            Ok(time) => metadata.time = time,
            Err(reason) => tracing::warn!(raw, %reason, "Ignoring malformed time field"),
        }
    }
    metadata
}

/// Parse the `audio:` descriptor and its chunk markers, reassemble the
/// payload, and verify its digest.
fn parse_lossless(lines: &[&str]) -> Result<Option<LosslessPayload>> {
    let chunks = collect_chunks(lines)?;
    let body = match extract_block(lines, "audio")? {
        Some(body) => body,
        None => {
            if !chunks.is_empty() {
                return Err(FormatError::MalformedDocument {
                    reason: "payload chunks present without an audio descriptor".to_string(),
                });
            }
            return Ok(None);
        }
    };
    let fields = parse_fields(&body);

    let sha256 = field(&fields, "sha256")
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "audio descriptor is missing the sha256 field".to_string(),
        })?
        .to_string();
    let chunk_count: usize = field(&fields, "chunks")
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "audio descriptor is missing the chunks field".to_string(),
        })?
        .parse()
        .map_err(|_| FormatError::MalformedDocument {
            reason: "audio descriptor has a non-numeric chunks field".to_string(),
        })?;
    if chunk_count > MAX_CHUNK_COUNT {
        return Err(FormatError::ChunkCountExceeded {
            max: MAX_CHUNK_COUNT,
            got: chunk_count,
        });
    }

    let chunk_size: usize = match field(&fields, "chunk_size") {
        Some(raw) => raw.parse().map_err(|_| FormatError::MalformedDocument {
            reason: "audio descriptor has a non-numeric chunk_size field".to_string(),
        })?,
        None => DEFAULT_CHUNK_SIZE,
    };
    if chunk_size == 0 {
        return Err(FormatError::InvalidChunkSize { got: chunk_size });
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(FormatError::MalformedDocument {
            reason: format!("declared chunk_size {chunk_size} exceeds limit {MAX_CHUNK_SIZE}"),
        });
    }

    let mut meta = PayloadMetadata {
        format: field(&fields, "format")
            .unwrap_or(LOSSLESS_FORMAT_TAG)
            .to_string(),
        sample_rate: parse_numeric_field(&fields, "sr").unwrap_or(44_100),
        channels: parse_numeric_field(&fields, "channels").unwrap_or(2),
        sha256,
        size_bytes: 0,
        chunk_count,
        chunk_size,
    };
    tracing::info!(
        format = %meta.format,
        sr = meta.sample_rate,
        channels = meta.channels,
        chunks = meta.chunk_count,
        "Parsed audio descriptor"
    );

    if chunks.len() > chunk_count {
        return Err(FormatError::TrailingGarbage {
            expected: chunk_count as u64,
            actual: chunks.len() as u64,
        });
    }
    let bytes = framer::unframe(&chunks, &meta)?;
    meta.size_bytes = bytes.len() as u64;
    meta.verify_digest(&bytes)?;
    tracing::debug!(size = bytes.len(), "Payload digest verified");

    Ok(Some(LosslessPayload {
        metadata: meta,
        bytes,
    }))
}

/// Collect every `<<PAYLOAD:FLAC:n>>` marker and the chunk text that
/// follows it. Markers are 1-based on the wire.
fn collect_chunks(lines: &[&str]) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if let Some(rest) = line.strip_prefix(PAYLOAD_MARKER_PREFIX) {
            let number: usize = rest
                .strip_suffix(">>")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| FormatError::MalformedDocument {
                    reason: format!("malformed payload marker '{line}'"),
                })?;
            if number == 0 {
                return Err(FormatError::MalformedDocument {
                    reason: "payload marker index 0 is invalid, markers start at 1".to_string(),
                });
            }
            let text = lines[i + 1..]
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty())
                .filter(|l| !l.starts_with("<<") && *l != "}")
                .ok_or_else(|| FormatError::MalformedDocument {
                    reason: format!("payload marker {number} has no chunk data"),
                })?;
            chunks.push(Chunk {
                sequence: number - 1,
                text: text.to_string(),
            });
        }
        i += 1;
    }
    Ok(chunks)
}

/// Parse the `neural:` descriptor and its token array, if present.
fn parse_neural(lines: &[&str]) -> Result<Option<NeuralPayload>> {
    let body = match extract_block(lines, "neural")? {
        Some(body) => body,
        None => {
            if lines.iter().any(|l| l.trim() == NEURAL_MARKER) {
                return Err(FormatError::MalformedDocument {
                    reason: "neural tokens present without a neural descriptor".to_string(),
                });
            }
            return Ok(None);
        }
    };
    let fields = parse_fields(&body);

    let model = field(&fields, "model")
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "neural descriptor is missing the model field".to_string(),
        })?
        .to_string();
    let declared: usize = field(&fields, "tokens")
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "neural descriptor is missing the tokens field".to_string(),
        })?
        .parse()
        .map_err(|_| FormatError::MalformedDocument {
            reason: "neural descriptor has a non-numeric tokens field".to_string(),
        })?;
    let compression_ratio: f64 = field(&fields, "compression_ratio")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0.0);

    let marker = lines
        .iter()
        .position(|l| l.trim() == NEURAL_MARKER)
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "neural descriptor present without a token marker".to_string(),
        })?;
    let json = lines[marker + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && *l != "}")
        .ok_or_else(|| FormatError::MalformedDocument {
            reason: "neural token marker has no token array".to_string(),
        })?;
    let tokens: Vec<i64> = serde_json::from_str(json)?;
    if tokens.len() != declared {
        return Err(FormatError::MalformedDocument {
            reason: format!(
                "neural descriptor declares {declared} tokens but the array holds {}",
                tokens.len()
            ),
        });
    }
    tracing::info!(model = %model, tokens = tokens.len(), "Parsed neural payload");

    Ok(Some(NeuralPayload {
        model,
        compression_ratio,
        tokens,
    }))
}

// ---------------------------------------------------------------
// Block and field helpers
// ---------------------------------------------------------------

/// Find the `key: {` block and return its inner text.
///
/// Handles both the inline form (`key: { a: 1, b: 2 }`) and the multiline
/// form where inner lines continue until a lone `}`. Returns `Ok(None)`
/// when the block is absent.
fn extract_block(lines: &[&str], key: &str) -> Result<Option<String>> {
    let prefix = format!("{key}:");
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        let Some(rest) = line.strip_prefix(&prefix) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(after_brace) = rest.strip_prefix('{') else {
            continue;
        };
        if let Some(inner) = after_brace.strip_suffix('}') {
            return Ok(Some(inner.trim().to_string()));
        }
        // Multiline block: collect until the closing brace.
        let mut inner: Vec<&str> = vec![after_brace.trim()];
        for raw in &lines[i + 1..] {
            let line = raw.trim();
            if line == "}" {
                let body = inner
                    .iter()
                    .filter(|l| !l.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                return Ok(Some(body));
            }
            inner.push(line);
        }
        return Err(FormatError::MalformedDocument {
            reason: format!("unterminated {key} block"),
        });
    }
    Ok(None)
}

/// Split an inline object body into `(key, value)` pairs.
///
/// Commas inside double quotes do not split fields, and values are returned
/// with surrounding quotes stripped. Segments without a colon are skipped.
fn parse_fields(body: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut segment = String::new();
    let mut in_quotes = false;
    for c in body.chars().chain(std::iter::once(',')) {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                segment.push(c);
            }
            ',' if !in_quotes => {
                if let Some((key, value)) = segment.split_once(':') {
                    let value = value.trim();
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value);
                    fields.push((key.trim().to_string(), value.to_string()));
                }
                segment.clear();
            }
            _ => segment.push(c),
        }
    }
    fields
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_numeric_field<T: std::str::FromStr>(fields: &[(String, String)], name: &str) -> Option<T> {
    field(fields, name).and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer;
    use crate::notes::NoteEvent;
    use crate::writer::DocumentWriter;

    /// Helper: build a document with a lossless payload over `bytes`.
    fn build_lossless_doc(bytes: &[u8], chunk_size: usize) -> String {
        let meta =
            PayloadMetadata::for_bytes(LOSSLESS_FORMAT_TAG, 44_100, 2, bytes, chunk_size).unwrap();
        let chunks = framer::frame(bytes, chunk_size).unwrap();
        let mut writer = DocumentWriter::new(SongMetadata::new(128, "C major"));
        writer.set_lossless(meta, chunks).unwrap();
        writer.finalize().unwrap()
    }

    #[test]
    fn test_round_trip_lossless() {
        let payload = b"hello world";
        let text = build_lossless_doc(payload, 4);
        let doc = parse_document(&text).unwrap();

        assert_eq!(doc.metadata.bpm, 128);
        assert_eq!(doc.metadata.key, "C major");
        let lossless = doc.lossless.unwrap();
        assert_eq!(lossless.bytes, payload);
        assert_eq!(lossless.metadata.chunk_count, 4);
        assert_eq!(lossless.metadata.size_bytes, 11);
        assert!(doc.neural.is_none());
    }

    #[test]
    fn test_round_trip_notes_and_metadata() {
        let mut writer = DocumentWriter::new(
            SongMetadata::new(96, "A minor")
                .with_time_signature(TimeSignature::new(6, 8))
                .with_chord("Am")
                .with_chord("F"),
        );
        writer.add_note(NoteEvent::new("A3", 0.0, 1.0));
        writer.add_note(NoteEvent::new("C4", 1.0, 0.5).with_velocity(0.6));
        let text = writer.finalize().unwrap();

        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.metadata.bpm, 96);
        assert_eq!(doc.metadata.time, TimeSignature::new(6, 8));
        assert_eq!(doc.metadata.chords, vec!["Am", "F"]);
        assert_eq!(doc.notes.len(), 2);
        assert_eq!(doc.notes[0].pitch, "A3");
        assert_eq!(doc.notes[1].velocity, 0.6);
        assert!(doc.note_diagnostics.is_empty());
    }

    #[test]
    fn test_round_trip_neural() {
        let mut writer = DocumentWriter::new(SongMetadata::default());
        writer.set_neural(NeuralPayload {
            model: "facebook/encodec_24khz".to_string(),
            compression_ratio: 100.0,
            tokens: vec![10, -20, 30, 0],
        });
        let text = writer.finalize().unwrap();

        let doc = parse_document(&text).unwrap();
        let neural = doc.neural.unwrap();
        assert_eq!(neural.model, "facebook/encodec_24khz");
        assert_eq!(neural.tokens, vec![10, -20, 30, 0]);
        assert_eq!(neural.compression_ratio, 100.0);
    }

    #[test]
    fn test_missing_meta_block_uses_defaults() {
        let text = "Song {\nPLAY C4 FOR 1.0s AT 0.0s\n}";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.metadata, SongMetadata::default());
        assert_eq!(doc.notes.len(), 1);
    }

    #[test]
    fn test_malformed_meta_fields_fall_back() {
        let text = "Song {\n  meta: { bpm: loud, key: \"D minor\", time: \"nope\" }\nPLAY C4 FOR 1.0s AT 0.0s\n}";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.metadata.bpm, 120);
        assert_eq!(doc.metadata.key, "D minor");
        assert_eq!(doc.metadata.time, TimeSignature::new(4, 4));
    }

    #[test]
    fn test_unknown_meta_fields_ignored() {
        let text =
            "Song {\n  meta: { bpm: 90, key: \"E\", time: \"3/4\", version: \"2\" }\nPLAY C4 FOR 1.0s AT 0.0s\n}";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.metadata.bpm, 90);
        assert_eq!(doc.metadata.time, TimeSignature::new(3, 4));
    }

    #[test]
    fn test_quoted_comma_in_key() {
        let text = "Song {\n  meta: { bpm: 90, key: \"C, then D\", time: \"4/4\" }\nPLAY C4 FOR 1.0s AT 0.0s\n}";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.metadata.key, "C, then D");
    }

    #[test]
    fn test_missing_envelope_rejected() {
        let err = parse_document("bpm: 120").unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = parse_document("").unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_missing_closing_brace_rejected() {
        let err = parse_document("Song {\n  meta: { bpm: 120 }").unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_tampered_chunk_fails_integrity() {
        let text = build_lossless_doc(b"hello world", 4);
        // Swap one base64 char for another valid one; the digest no longer
        // matches the reassembled bytes.
        let tampered = text.replace("aGVs", "aGVt");
        assert_ne!(text, tampered);
        let err = parse_document(&tampered).unwrap_err();
        assert!(matches!(err, FormatError::IntegrityError { .. }));
    }

    #[test]
    fn test_removed_chunk_is_missing() {
        let text = build_lossless_doc(b"hello world", 4);
        let filtered: Vec<&str> = text
            .lines()
            .filter(|l| *l != "<<PAYLOAD:FLAC:2>>" && *l != "bG8g")
            .collect();
        let err = parse_document(&filtered.join("\n")).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingChunk {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_extra_chunk_is_trailing_garbage() {
        let text = build_lossless_doc(b"hello world", 4);
        let body = text.strip_suffix('}').unwrap();
        let extra = format!("{body}<<PAYLOAD:FLAC:5>>\nAAAA\n}}");
        let err = parse_document(&extra).unwrap_err();
        assert!(matches!(err, FormatError::TrailingGarbage { .. }));
    }

    #[test]
    fn test_marker_index_zero_rejected() {
        let text = build_lossless_doc(b"hello world", 4);
        let bad = text.replace("<<PAYLOAD:FLAC:1>>", "<<PAYLOAD:FLAC:0>>");
        let err = parse_document(&bad).unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_chunks_without_descriptor_rejected() {
        let text = "Song {\n<<PAYLOAD:FLAC:1>>\naGVs\n}";
        let err = parse_document(text).unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_descriptor_missing_sha256_rejected() {
        let text = "Song {\n  audio: {\n    format: \"flac\", sr: 44100, channels: 2,\n    chunks: 1, chunk_size: 65536\n  }\n\n<<PAYLOAD:FLAC:1>>\naGVs\n}";
        let err = parse_document(text).unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_excessive_chunk_count_rejected() {
        let text = format!(
            "Song {{\n  audio: {{\n    format: \"flac\", sr: 44100, channels: 2,\n    sha256: \"00\", chunks: {}, chunk_size: 65536\n  }}\n}}",
            MAX_CHUNK_COUNT + 1
        );
        let err = parse_document(&text).unwrap_err();
        assert!(matches!(err, FormatError::ChunkCountExceeded { .. }));
    }

    #[test]
    fn test_neural_token_count_mismatch_rejected() {
        let mut writer = DocumentWriter::new(SongMetadata::default());
        writer.set_neural(NeuralPayload {
            model: "facebook/encodec_24khz".to_string(),
            compression_ratio: 100.0,
            tokens: vec![1, 2, 3],
        });
        let text = writer.finalize().unwrap();
        let bad = text.replace("[1,2,3]", "[1,2]");
        let err = parse_document(&bad).unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_neural_tokens_without_descriptor_rejected() {
        let text = "Song {\n<<NEURAL_TOKENS>>\n[1,2,3]\n}";
        let err = parse_document(text).unwrap_err();
        assert!(matches!(err, FormatError::MalformedDocument { .. }));
    }

    #[test]
    fn test_malformed_play_line_recovered() {
        let text = "Song {\n  meta: { bpm: 100, key: \"C\", time: \"4/4\" }\n  PLAY C4 FOR 1.0s AT 0.0s\n  PLAY broken FOR xs AT 0.0s\n}";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.notes.len(), 1);
        assert_eq!(doc.note_diagnostics.len(), 1);
        assert_eq!(doc.note_diagnostics[0].line, 4);
    }

    #[test]
    fn test_both_payloads_round_trip() {
        let payload = b"flac-ish bytes go here";
        let meta =
            PayloadMetadata::for_bytes(LOSSLESS_FORMAT_TAG, 44_100, 2, payload, 8).unwrap();
        let chunks = framer::frame(payload, 8).unwrap();
        let mut writer = DocumentWriter::new(SongMetadata::new(110, "G"));
        writer.set_lossless(meta, chunks).unwrap();
        writer.set_neural(NeuralPayload {
            model: "facebook/encodec_24khz".to_string(),
            compression_ratio: 50.0,
            tokens: vec![7, 8, 9],
        });
        let text = writer.finalize().unwrap();

        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.lossless.unwrap().bytes, payload);
        assert_eq!(doc.neural.unwrap().tokens, vec![7, 8, 9]);
    }
}
