//! Base64 chunk framing for embedded binary payloads.
//!
//! A payload is base64-encoded once, then the encoded text is sliced into
//! fixed-size character chunks. Each chunk carries a 0-based sequence number
//! so the reader can detect gaps before attempting a decode. Reassembly
//! concatenates the chunk text in sequence order and decodes the whole string
//! in one pass, so chunk boundaries need not fall on 4-character base64
//! group boundaries.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};
use crate::payload::PayloadMetadata;

/// Default chunk size in base64 characters.
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// One slice of a payload's base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position within the payload.
    pub sequence: usize,
    /// Base64 text, at most `chunk_size` characters. Only the final chunk
    /// may be shorter.
    pub text: String,
}

/// Split `bytes` into base64 chunks of at most `chunk_size` characters.
///
/// Empty input yields zero chunks. `chunk_size` must be at least 1.
pub fn frame(bytes: &[u8], chunk_size: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(FormatError::InvalidChunkSize { got: chunk_size });
    }
    let encoded = STANDARD.encode(bytes);
    // Base64 text is pure ASCII, so byte-wise slicing never splits a char.
    let chunks = encoded
        .as_bytes()
        .chunks(chunk_size)
        .enumerate()
        .map(|(sequence, piece)| Chunk {
            sequence,
            text: String::from_utf8_lossy(piece).into_owned(),
        })
        .collect();
    Ok(chunks)
}

/// Reassemble and decode a framed payload, checking it against `meta`.
///
/// Verifies chunk count and sequence contiguity before decoding; a gap or
/// shortfall is reported as [`FormatError::MissingChunk`] and an over-long
/// or misshapen chunk as [`FormatError::TrailingGarbage`]. The payload
/// digest is NOT checked here; callers verify it via
/// [`PayloadMetadata::verify_digest`] once the bytes are reassembled.
pub fn unframe(chunks: &[Chunk], meta: &PayloadMetadata) -> Result<Vec<u8>> {
    if chunks.len() != meta.chunk_count {
        return Err(FormatError::MissingChunk {
            expected: meta.chunk_count,
            found: chunks.len(),
        });
    }

    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.sequence);
    for (index, chunk) in ordered.iter().enumerate() {
        if chunk.sequence != index {
            return Err(FormatError::MissingChunk {
                expected: index,
                found: chunk.sequence,
            });
        }
    }

    let mut encoded = String::new();
    let last = ordered.len().saturating_sub(1);
    for (index, chunk) in ordered.iter().enumerate() {
        let len = chunk.text.len();
        if index < last && len != meta.chunk_size {
            return Err(FormatError::TrailingGarbage {
                expected: meta.chunk_size as u64,
                actual: len as u64,
            });
        }
        if index == last && (len == 0 || len > meta.chunk_size) {
            return Err(FormatError::TrailingGarbage {
                expected: meta.chunk_size as u64,
                actual: len as u64,
            });
        }
        encoded.push_str(&chunk.text);
    }

    let bytes = STANDARD.decode(encoded.as_bytes())?;
    if meta.size_bytes != 0 && bytes.len() as u64 != meta.size_bytes {
        return Err(FormatError::TrailingGarbage {
            expected: meta.size_bytes,
            actual: bytes.len() as u64,
        });
    }
    Ok(bytes)
}
