//! Neural token backends.
//!
//! Token encoding is pluggable: a [`NeuralBackend`] turns a mono 24 kHz
//! stream into an integer token sequence and back. Backends are looked up
//! by model identifier through a [`NeuralRegistry`], so documents encoded
//! with a model this build does not carry fail with a clear
//! [`CodecError::UnavailableCodec`] instead of producing wrong audio.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CodecError, Result};
use crate::stream::AudioStream;

/// Model identifier used when the caller does not pick one.
pub const DEFAULT_NEURAL_MODEL: &str = "facebook/encodec_24khz";

/// Sample rate all neural backends operate at.
pub const NEURAL_SAMPLE_RATE: u32 = 24_000;

/// A neural token codec.
///
/// `encode_tokens` expects mono audio at [`NeuralBackend::sample_rate`];
/// callers normalize first. `decode_tokens` returns mono audio at the same
/// rate.
pub trait NeuralBackend: Send + Sync + std::fmt::Debug {
    /// Model identifier carried in document descriptors.
    fn model_id(&self) -> &str;

    /// Native sample rate of this backend.
    fn sample_rate(&self) -> u32 {
        NEURAL_SAMPLE_RATE
    }

    fn encode_tokens(&self, stream: &AudioStream) -> Result<Vec<i64>>;

    fn decode_tokens(&self, tokens: &[i64]) -> Result<AudioStream>;
}

/// Registry of available neural backends, keyed by model identifier.
#[derive(Clone, Default)]
pub struct NeuralRegistry {
    backends: HashMap<String, Arc<dyn NeuralBackend>>,
}

impl NeuralRegistry {
    /// An empty registry. Every lookup fails until backends are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in backends.
    pub fn with_default_backends() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StrideBackend::default()));
        registry
    }

    pub fn register(&mut self, backend: Arc<dyn NeuralBackend>) {
        tracing::debug!(model = backend.model_id(), "Registered neural backend");
        self.backends.insert(backend.model_id().to_string(), backend);
    }

    /// Look up a backend, failing with [`CodecError::UnavailableCodec`]
    /// when the model is not registered.
    pub fn get(&self, model_id: &str) -> Result<&Arc<dyn NeuralBackend>> {
        self.backends
            .get(model_id)
            .ok_or_else(|| CodecError::UnavailableCodec {
                requested: model_id.to_string(),
            })
    }

    /// Registered model identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Stride-and-scale token backend.
///
/// Takes every `stride`-th sample and scales it into an integer token;
/// decoding linearly interpolates the tokens back up to the original
/// length. A stand-in with the same token interface as a learned codec,
/// useful for tests and for documents that must stay self-contained.
#[derive(Debug)]
pub struct StrideBackend {
    stride: usize,
    scale: f64,
}

impl StrideBackend {
    pub fn new(stride: usize, scale: f64) -> Self {
        Self { stride, scale }
    }
}

impl Default for StrideBackend {
    fn default() -> Self {
        Self::new(100, 1000.0)
    }
}

impl NeuralBackend for StrideBackend {
    fn model_id(&self) -> &str {
        DEFAULT_NEURAL_MODEL
    }

    fn encode_tokens(&self, stream: &AudioStream) -> Result<Vec<i64>> {
        if stream.channels() != 1 {
            return Err(CodecError::EncodingError(format!(
                "neural encoding expects mono input, got {} channels",
                stream.channels()
            )));
        }
        if stream.frames() == 0 {
            return Err(CodecError::EncodingError(
                "cannot encode an empty audio stream".to_string(),
            ));
        }
        // Truncation, not rounding: token = int(sample * scale).
        let tokens: Vec<i64> = stream
            .samples()
            .iter()
            .step_by(self.stride)
            .map(|&x| (x as f64 * self.scale) as i64)
            .collect();
        tracing::debug!(
            frames = stream.frames(),
            tokens = tokens.len(),
            stride = self.stride,
            "Encoded neural tokens"
        );
        Ok(tokens)
    }

    fn decode_tokens(&self, tokens: &[i64]) -> Result<AudioStream> {
        if tokens.is_empty() {
            return Err(CodecError::DecodingError(
                "cannot decode an empty token sequence".to_string(),
            ));
        }
        let coarse: Vec<f32> = tokens.iter().map(|&t| (t as f64 / self.scale) as f32).collect();
        let frames = coarse.len() * self.stride;
        let mut samples = Vec::with_capacity(frames);
        for i in 0..frames {
            let pos = i as f64 / self.stride as f64;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            if idx + 1 < coarse.len() {
                samples.push(coarse[idx] * (1.0 - frac) + coarse[idx + 1] * frac);
            } else {
                samples.push(coarse[coarse.len() - 1]);
            }
        }
        AudioStream::new(samples, self.sample_rate(), 1)
    }
}
