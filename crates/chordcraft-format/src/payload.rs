//! Payload descriptors and digest helpers.
//!
//! A lossless payload is described by a [`PayloadMetadata`] record carried in
//! the document's `audio:` block. The descriptor is written before the chunked
//! payload text and drives reassembly and verification on the read side.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{FormatError, Result};

/// Format tag carried by lossless payload descriptors.
pub const LOSSLESS_FORMAT_TAG: &str = "flac";

/// Format tag carried by neural token descriptors.
pub const NEURAL_FORMAT_TAG: &str = "neural_codec";

/// Descriptor for one embedded binary payload.
///
/// `sha256` is the lowercase hex digest of the raw payload bytes (before
/// base64 framing). `chunk_count` and `chunk_size` describe the framing so a
/// reader can detect missing or oversized chunks before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMetadata {
    /// Codec format tag, e.g. [`LOSSLESS_FORMAT_TAG`].
    pub format: String,
    /// Payload sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count (1 or 2).
    pub channels: u8,
    /// Lowercase hex SHA-256 of the raw payload bytes.
    pub sha256: String,
    /// Raw payload size in bytes. 0 when parsed from a document, where the
    /// size is not carried on the wire; the decoder fills it in after
    /// reassembly.
    #[serde(default)]
    pub size_bytes: u64,
    /// Number of base64 chunks the payload was split into.
    pub chunk_count: usize,
    /// Maximum characters per chunk.
    pub chunk_size: usize,
}

impl PayloadMetadata {
    /// Build a descriptor for `bytes` framed at `chunk_size`.
    pub fn for_bytes(
        format: impl Into<String>,
        sample_rate: u32,
        channels: u8,
        bytes: &[u8],
        chunk_size: usize,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(FormatError::InvalidChunkSize { got: chunk_size });
        }
        Ok(Self {
            format: format.into(),
            sample_rate,
            channels,
            sha256: sha256_hex(bytes),
            size_bytes: bytes.len() as u64,
            chunk_count: base64_encoded_len(bytes.len()).div_ceil(chunk_size),
            chunk_size,
        })
    }

    /// Check `bytes` against the stored digest.
    ///
    /// Digest comparison is case-insensitive; the stored digest may come from
    /// a hand-edited document.
    pub fn verify_digest(&self, bytes: &[u8]) -> Result<()> {
        let actual = sha256_hex(bytes);
        if !self.sha256.eq_ignore_ascii_case(&actual) {
            return Err(FormatError::IntegrityError {
                expected: self.sha256.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Length of the standard (padded) base64 encoding of `n` raw bytes.
pub fn base64_encoded_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}
