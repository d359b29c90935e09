use std::sync::Arc;

/// Shared, immutable block of decoded audio.
///
/// `SampleBuffer` keeps its interleaved samples in an `Arc<[f32]>`, so cloning
/// only bumps a reference count and every holder sees the same data. Nothing
/// can mutate the samples once the buffer exists; transforms such as
/// resampling or mixing always produce a new buffer.
///
/// # Memory Layout
///
/// ```text
/// SampleBuffer (24 bytes on stack)
/// ├─ samples: Arc<[f32]> (16 bytes) ────> Heap: [f32; N]
/// ├─ sample_rate: u32 (4 bytes)
/// └─ channels: u16 (2 bytes)
/// ```
///
/// # Examples
///
/// ```
/// use podmix_transport::SampleBuffer;
///
/// let buffer = SampleBuffer::new(vec![0.0, 0.5, 1.0, 0.5], 44100, 2);
/// let shared = buffer.clone();
/// assert_eq!(buffer.frames(), 2);
/// assert_eq!(shared.samples()[1], 0.5);
/// ```
#[derive(Clone)]
pub struct SampleBuffer {
    /// Interleaved samples: [L, R, L, R, ...] for stereo.
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Create a buffer from interleaved samples.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or if `samples.len()` is not divisible by `channels`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self::from_arc(Arc::from(samples), sample_rate, channels)
    }

    /// Create a buffer from an existing `Arc<[f32]>` without copying.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or if `samples.len()` is not divisible by `channels`.
    pub fn from_arc(samples: Arc<[f32]>, sample_rate: u32, channels: u16) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert_eq!(
            samples.len() % channels as usize,
            0,
            "samples.len() must be divisible by channels"
        );
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Create a buffer from one sample vector per channel.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is empty or the channels differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use podmix_transport::SampleBuffer;
    ///
    /// let buffer = SampleBuffer::from_channels(vec![vec![0.1, 0.2], vec![0.3, 0.4]], 48000);
    /// assert_eq!(buffer.samples(), &[0.1, 0.3, 0.2, 0.4]);
    /// ```
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        assert!(!channels.is_empty(), "channels must be greater than 0");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|ch| ch.len() == frames),
            "all channels must have the same length"
        );

        let mut samples = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            for ch in &channels {
                samples.push(ch[frame]);
            }
        }

        Self::new(samples, sample_rate, channels.len() as u16)
    }

    /// A zero-filled buffer of `frames` frames.
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> Self {
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// All interleaved samples.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The inner `Arc<[f32]>`, for reference-count checks.
    pub fn samples_arc(&self) -> &Arc<[f32]> {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Total number of samples (frames * channels).
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// A single sample, or `None` when `channel` or `frame` is out of range.
    #[inline]
    pub fn sample(&self, channel: usize, frame: usize) -> Option<f32> {
        let channels = self.channels as usize;
        if channel >= channels {
            return None;
        }
        self.samples.get(frame * channels + channel).copied()
    }

    /// Iterate over one channel's samples.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is >= `self.channels()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use podmix_transport::SampleBuffer;
    ///
    /// let buffer = SampleBuffer::new(vec![0.0, 1.0, 0.5, 1.5], 44100, 2);
    /// let right: Vec<f32> = buffer.channel(1).collect();
    /// assert_eq!(right, vec![1.0, 1.5]);
    /// ```
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        assert!(
            channel < self.channels as usize,
            "channel index out of bounds"
        );
        let channels = self.channels as usize;
        (0..self.frames()).map(move |frame| self.samples[frame * channels + channel])
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Resample to `target_sample_rate`, or return a cheap clone when the rate
    /// already matches.
    pub fn resample(&self, target_sample_rate: u32) -> anyhow::Result<Self> {
        crate::resample::resample_buffer(self, target_sample_rate)
    }
}

impl std::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("frames", &self.frames())
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("duration_secs", &self.duration_secs())
            .finish()
    }
}

impl PartialEq for SampleBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.sample_rate == other.sample_rate
            && self.channels == other.channels
            && self.samples == other.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let buffer = SampleBuffer::new(vec![0.0, 0.1, 0.2, 0.3], 44100, 2);

        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "channels must be greater than 0")]
    fn test_zero_channels() {
        SampleBuffer::new(vec![0.0], 44100, 0);
    }

    #[test]
    #[should_panic(expected = "samples.len() must be divisible by channels")]
    fn test_invalid_length() {
        SampleBuffer::new(vec![0.0, 0.1, 0.2, 0.3, 0.4], 44100, 2);
    }

    #[test]
    #[should_panic(expected = "all channels must have the same length")]
    fn test_from_channels_ragged() {
        SampleBuffer::from_channels(vec![vec![0.0, 0.1], vec![0.2]], 44100);
    }

    #[test]
    fn test_clone_shares_samples() {
        let buffer = SampleBuffer::new(vec![0.0; 100_000], 44100, 2);
        let shared = buffer.clone();

        assert_eq!(Arc::strong_count(buffer.samples_arc()), 2);
        assert_eq!(Arc::strong_count(shared.samples_arc()), 2);
    }

    #[test]
    fn test_from_channels_interleaves() {
        let buffer = SampleBuffer::from_channels(
            vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]],
            48000,
        );

        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.samples(), &[1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn test_sample_lookup() {
        let buffer = SampleBuffer::new(vec![0.0, 1.0, 0.5, 1.5], 44100, 2);

        assert_eq!(buffer.sample(0, 1), Some(0.5));
        assert_eq!(buffer.sample(1, 0), Some(1.0));
        assert_eq!(buffer.sample(2, 0), None);
        assert_eq!(buffer.sample(0, 2), None);
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::silence(44100, 44100, 2);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_spans_channels() {
        let buffer = SampleBuffer::new(vec![0.1, -0.2, 0.05, -0.7], 44100, 2);
        assert_eq!(buffer.peak(), 0.7);
    }

    #[test]
    #[should_panic(expected = "channel index out of bounds")]
    fn test_channel_out_of_bounds() {
        let buffer = SampleBuffer::new(vec![0.0, 0.0], 44100, 2);
        let _: Vec<f32> = buffer.channel(2).collect();
    }

    #[test]
    fn test_empty() {
        let buffer = SampleBuffer::new(vec![], 44100, 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.frames(), 0);
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn test_debug_format() {
        let debug_str = format!("{:?}", SampleBuffer::silence(10, 44100, 1));

        assert!(debug_str.contains("SampleBuffer"));
        assert!(debug_str.contains("frames"));
        assert!(debug_str.contains("duration_secs"));
    }
}
