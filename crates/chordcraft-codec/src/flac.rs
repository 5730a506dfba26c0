//! FLAC lossless payload codec.
//!
//! Encodes normalized f32 audio into a FLAC stream at 16-bit depth and
//! decodes it back. Quantization is symmetric (divide and multiply by the
//! same scale), so a stream that round-trips through 16-bit stays
//! bit-identical across encode/decode cycles.

use std::io::Cursor;

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use chordcraft_format::{PayloadMetadata, LOSSLESS_FORMAT_TAG};

use crate::error::{CodecError, Result};
use crate::stream::AudioStream;

/// Bit depth used for lossless payloads.
pub const LOSSLESS_BIT_DEPTH: u32 = 16;

const QUANT_SCALE: f32 = 32_767.0;

/// Encode a stream to FLAC bytes plus a payload descriptor.
///
/// `chunk_size` only shapes the descriptor's framing fields; the FLAC bytes
/// themselves are unaffected by it.
pub fn encode_lossless(stream: &AudioStream, chunk_size: usize) -> Result<(Vec<u8>, PayloadMetadata)> {
    if stream.frames() == 0 {
        return Err(CodecError::EncodingError(
            "cannot encode an empty audio stream".to_string(),
        ));
    }

    let quantized: Vec<i32> = stream
        .samples()
        .iter()
        .map(|&x| (x.clamp(-1.0, 1.0) * QUANT_SCALE).round() as i32)
        .collect();

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|_| CodecError::EncodingError("invalid FLAC encoder configuration".to_string()))?;
    let source = MemSource::from_samples(
        &quantized,
        stream.channels() as usize,
        LOSSLESS_BIT_DEPTH as usize,
        stream.sample_rate() as usize,
    );
    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|_| CodecError::EncodingError("FLAC encoding failed".to_string()))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|_| CodecError::EncodingError("failed to serialize FLAC stream".to_string()))?;
    let bytes = sink.as_slice().to_vec();

    let meta = PayloadMetadata::for_bytes(
        LOSSLESS_FORMAT_TAG,
        stream.sample_rate(),
        stream.channels(),
        &bytes,
        chunk_size,
    )?;
    tracing::info!(
        frames = stream.frames(),
        channels = stream.channels(),
        size = bytes.len(),
        chunks = meta.chunk_count,
        "Encoded lossless payload"
    );
    Ok((bytes, meta))
}

/// Decode FLAC bytes back into an [`AudioStream`].
pub fn decode_lossless(bytes: &[u8]) -> Result<AudioStream> {
    let mut reader = claxon::FlacReader::new(Cursor::new(bytes))
        .map_err(|e| CodecError::DecodingError(format!("invalid FLAC stream: {e}")))?;

    let info = reader.streaminfo();
    let sample_rate = info.sample_rate;
    let channels = info.channels as u8;
    let bits = info.bits_per_sample;
    if bits != LOSSLESS_BIT_DEPTH {
        return Err(CodecError::DecodingError(format!(
            "unsupported FLAC bit depth {bits}, expected {LOSSLESS_BIT_DEPTH}"
        )));
    }

    let mut samples = Vec::new();
    for sample in reader.samples() {
        let s = sample.map_err(|e| CodecError::DecodingError(format!("FLAC decode failed: {e}")))?;
        samples.push(s as f32 / QUANT_SCALE);
    }

    tracing::debug!(
        sample_rate,
        channels,
        samples = samples.len(),
        "Decoded lossless payload"
    );
    AudioStream::new(samples, sample_rate, channels)
}
