use crate::SampleBuffer;

/// Reduce channel 0 of `buffer` to `width` peak magnitudes for display.
///
/// The channel is cut into `width` contiguous windows of
/// `frames / width` frames (floor division) and each window yields its
/// largest absolute sample. Frames past `width * window` are dropped, and a
/// buffer shorter than `width` frames yields all zeros.
///
/// # Examples
///
/// ```
/// use podmix_transport::{SampleBuffer, peaks};
///
/// let buffer = SampleBuffer::new(vec![0.1, -0.5, 0.2, 0.3, 0.9], 8000, 1);
/// assert_eq!(peaks(&buffer, 2), vec![0.5, 0.3]);
/// ```
pub fn peaks(buffer: &SampleBuffer, width: usize) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }

    let window = buffer.frames() / width;
    if window == 0 {
        return vec![0.0; width];
    }

    let channels = buffer.channels() as usize;
    let samples = buffer.samples();

    (0..width)
        .map(|bucket| {
            let start = bucket * window;
            (start..start + window)
                .map(|frame| samples[frame * channels].abs())
                .fold(0.0f32, f32::max)
        })
        .collect()
}
