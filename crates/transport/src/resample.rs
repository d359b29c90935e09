use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::SampleBuffer;

/// Resample a buffer to `target_sample_rate` with sinc interpolation.
///
/// A buffer already at the target rate comes back as a cheap clone. Empty
/// buffers are relabelled without running the resampler.
///
/// # Examples
///
/// ```
/// use podmix_transport::{SampleBuffer, resample_buffer};
///
/// let buffer = SampleBuffer::silence(44100, 44100, 1);
/// let resampled = resample_buffer(&buffer, 48000).unwrap();
/// assert_eq!(resampled.sample_rate(), 48000);
/// ```
pub fn resample_buffer(buffer: &SampleBuffer, target_sample_rate: u32) -> anyhow::Result<SampleBuffer> {
    if buffer.sample_rate() == target_sample_rate {
        return Ok(buffer.clone());
    }
    if target_sample_rate == 0 || buffer.sample_rate() == 0 {
        anyhow::bail!(
            "cannot resample from {} Hz to {} Hz",
            buffer.sample_rate(),
            target_sample_rate
        );
    }
    if buffer.is_empty() {
        return Ok(SampleBuffer::new(Vec::new(), target_sample_rate, buffer.channels()));
    }

    let channels = buffer.channels() as usize;
    let input_frames = buffer.frames();
    let resample_ratio = target_sample_rate as f64 / buffer.sample_rate() as f64;

    // rubato works on planar data
    let input_channels: Vec<Vec<f32>> = (0..channels).map(|ch| buffer.channel(ch).collect()).collect();

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, input_frames, channels)?;
    let output_channels = resampler.process(&input_channels, None)?;

    Ok(SampleBuffer::from_channels(output_channels, target_sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::sync::Arc;

    fn sine(frequency: f32, sample_rate: u32, duration_secs: f32, channels: u16) -> SampleBuffer {
        let frames = (sample_rate as f32 * duration_secs) as usize;
        let mut samples = Vec::with_capacity(frames * channels as usize);
        for i in 0..frames {
            let value = (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin();
            for _ in 0..channels {
                samples.push(value);
            }
        }
        SampleBuffer::new(samples, sample_rate, channels)
    }

    #[test]
    fn test_same_rate_is_shared() {
        let buffer = sine(440.0, 44100, 0.1, 2);
        let resampled = buffer.resample(44100).unwrap();

        assert_eq!(resampled.len(), buffer.len());
        assert_eq!(Arc::strong_count(buffer.samples_arc()), 2);
    }

    #[test]
    fn test_upsampling_scales_length() {
        let buffer = sine(440.0, 44100, 0.1, 2);
        let resampled = buffer.resample(48000).unwrap();

        assert_eq!(resampled.sample_rate(), 48000);
        assert_eq!(resampled.channels(), 2);

        let expected = (buffer.frames() as f64 * 48000.0 / 44100.0) as i64;
        let tolerance = (expected as f64 * 0.03) as i64;
        assert!(
            (resampled.frames() as i64 - expected).abs() <= tolerance,
            "expected ~{} frames, got {}",
            expected,
            resampled.frames()
        );
    }

    #[test]
    fn test_mono_stays_mono() {
        let resampled = sine(440.0, 44100, 0.05, 1).resample(22050).unwrap();

        assert_eq!(resampled.channels(), 1);
        assert_eq!(resampled.sample_rate(), 22050);
    }

    #[test]
    fn test_empty_buffer() {
        let empty = SampleBuffer::new(vec![], 44100, 2);
        let resampled = empty.resample(48000).unwrap();

        assert!(resampled.is_empty());
        assert_eq!(resampled.sample_rate(), 48000);
        assert_eq!(resampled.channels(), 2);
    }

    #[test]
    fn test_zero_target_rate_fails() {
        assert!(sine(440.0, 44100, 0.01, 1).resample(0).is_err());
    }
}
