//! Input conditioning — resampling and channel-layout conversion.
//!
//! Every encode path runs its input through [`normalize`] so the payload
//! codecs only ever see audio at their native rate and layout. Resampling
//! uses linear interpolation per channel plane; channel conversion averages
//! stereo down to mono and duplicates mono up to stereo.

use crate::error::Result;
use crate::stream::AudioStream;

/// Resample and re-layout `input` to `target_sample_rate` and the requested
/// channel count.
///
/// The input passes through untouched when it already matches. Resampling
/// happens before channel conversion so both planes see the same grid.
pub fn normalize(input: &AudioStream, target_sample_rate: u32, want_stereo: bool) -> Result<AudioStream> {
    let target_channels: u8 = if want_stereo { 2 } else { 1 };
    if input.sample_rate() == target_sample_rate && input.channels() == target_channels {
        return Ok(input.clone());
    }

    let mut planes = deinterleave(input.samples(), input.channels());
    if input.sample_rate() != target_sample_rate {
        for plane in &mut planes {
            *plane = resample_plane(plane, input.sample_rate(), target_sample_rate);
        }
    }

    let planes = match (planes.len(), target_channels) {
        (1, 2) => vec![planes[0].clone(), planes[0].clone()],
        (2, 1) => {
            let mono: Vec<f32> = planes[0]
                .iter()
                .zip(planes[1].iter())
                .map(|(l, r)| (l + r) * 0.5)
                .collect();
            vec![mono]
        }
        _ => planes,
    };

    tracing::debug!(
        input_rate = input.sample_rate(),
        target_rate = target_sample_rate,
        input_channels = input.channels(),
        target_channels,
        frames = planes[0].len(),
        "Normalized audio"
    );

    AudioStream::new(interleave(&planes), target_sample_rate, target_channels)
}

/// Linear-interpolation resample of one channel plane.
fn resample_plane(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if samples.is_empty() || source_rate == target_rate {
        return samples.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let new_len = (samples.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        if idx + 1 < samples.len() {
            output.push(samples[idx] * (1.0 - frac) + samples[idx + 1] * frac);
        } else if idx < samples.len() {
            output.push(samples[idx]);
        }
    }
    output
}

fn deinterleave(samples: &[f32], channels: u8) -> Vec<Vec<f32>> {
    let channels = channels as usize;
    let mut planes = vec![Vec::with_capacity(samples.len() / channels); channels];
    for frame in samples.chunks_exact(channels) {
        for (plane, &sample) in planes.iter_mut().zip(frame) {
            plane.push(sample);
        }
    }
    planes
}

fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    let frames = planes[0].len();
    let mut samples = Vec::with_capacity(frames * planes.len());
    for i in 0..frames {
        for plane in planes {
            samples.push(plane[i]);
        }
    }
    samples
}
