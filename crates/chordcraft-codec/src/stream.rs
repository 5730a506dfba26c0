//! Validated in-memory audio: interleaved f32 samples plus shape.

use crate::error::{CodecError, Result};

/// An interleaved f32 audio buffer with a known sample rate and channel
/// count.
///
/// Invariants are checked at construction: the sample rate is non-zero, the
/// channel count is 1 or 2, and the sample count divides evenly into frames.
/// Samples are nominally in `[-1.0, 1.0]`; out-of-range values are clamped
/// at quantization time rather than rejected here.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u8,
}

impl AudioStream {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u8) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CodecError::InvalidStream {
                reason: "sample rate must be non-zero".to_string(),
            });
        }
        if channels == 0 || channels > 2 {
            return Err(CodecError::InvalidStream {
                reason: format!("unsupported channel count {channels}, expected 1 or 2"),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(CodecError::InvalidStream {
                reason: format!(
                    "sample count {} does not divide into {} channels",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
