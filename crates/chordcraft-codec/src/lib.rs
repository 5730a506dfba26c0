//! # chordcraft-codec
//!
//! Audio pipeline for the ChordCraft Code format.
//! Turns raw audio into embeddable document text and back via:
//! - **Normalization** — resampling and channel-layout conversion
//! - **FLAC** — lossless payload encoding at 16-bit depth
//! - **Neural backends** — pluggable token codecs behind a registry
//! - **Pipeline** — one-call encode/decode over the format crate

pub mod error;
pub mod flac;
pub mod neural;
pub mod normalize;
pub mod pipeline;
pub mod stream;

pub use error::{CodecError, Result};
pub use flac::{decode_lossless, encode_lossless, LOSSLESS_BIT_DEPTH};
pub use neural::{
    NeuralBackend, NeuralRegistry, StrideBackend, DEFAULT_NEURAL_MODEL, NEURAL_SAMPLE_RATE,
};
pub use normalize::normalize;
pub use pipeline::{
    decode, encode, extract_lossless, extract_neural, EncodeRequest, LOSSLESS_SAMPLE_RATE,
};
pub use stream::AudioStream;
