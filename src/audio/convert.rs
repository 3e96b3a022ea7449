//! Sample format conversion
//!
//! Runs per-sample on the audio callback thread, so everything here is
//! allocation-free except the explicit downmix helper.

/// Convert one floating-point sample in [-1.0, 1.0] to 16-bit signed PCM.
///
/// Input is clipped before scaling, and the scaled value is clipped again
/// to the i16 range so rounding overshoot can never wrap.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    let clipped = sample.clamp(-1.0, 1.0);
    let scaled = (clipped * 32767.0).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Average interleaved multi-channel samples down to mono.
///
/// `channels == 1` input is returned as-is (single copy, no averaging).
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Serialize samples as raw little-endian 16-bit PCM.
pub fn pcm_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
