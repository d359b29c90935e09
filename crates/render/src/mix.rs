use podmix_transport::{Clip, ClipId, SampleBuffer, SourceError, SourceProvider};

use crate::settings::{MixSettings, RatePolicy, SyncMode};

/// Frame positions closer than this to an integer are snapped to it, so that
/// `2.0 s * 48000` lands on frame 96000 even with rounding noise.
const FRAME_EPSILON: f64 = 1e-6;

/// The master bus is always stereo.
const OUTPUT_CHANNELS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum MixError {
    #[error("timeline has no clips to mix")]
    EmptyTimeline,

    #[error("none of the {} clip sources could be used", skipped.len())]
    AllSourcesFailed { skipped: Vec<SkippedClip> },
}

/// A clip left out of the mix because its source was unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedClip {
    pub clip: ClipId,
    pub error: SourceError,
}

#[derive(Debug, Clone)]
pub struct MixOutput {
    /// Stereo master at the first usable clip's sample rate
    pub buffer: SampleBuffer,
    /// Peak magnitude before normalization
    pub peak: f32,
    /// Scale applied by headroom normalization (1.0 when untouched)
    pub applied_gain: f32,
    pub skipped: Vec<SkippedClip>,
}

pub fn seconds_to_frames_floor(seconds: f64, sample_rate: u32) -> usize {
    let exact = seconds.max(0.0) * sample_rate as f64;
    let nearest = exact.round();
    if (exact - nearest).abs() < FRAME_EPSILON {
        nearest as usize
    } else {
        exact.floor() as usize
    }
}

pub fn seconds_to_frames_ceil(seconds: f64, sample_rate: u32) -> usize {
    let exact = seconds.max(0.0) * sample_rate as f64;
    let nearest = exact.round();
    if (exact - nearest).abs() < FRAME_EPSILON {
        nearest as usize
    } else {
        exact.ceil() as usize
    }
}

/// Signed frame on the output grid containing `seconds`, with the same
/// snapping as [`seconds_to_frames_floor`].
fn frame_index(seconds: f64, sample_rate: u32) -> i64 {
    let exact = seconds * sample_rate as f64;
    let nearest = exact.round();
    if (exact - nearest).abs() < FRAME_EPSILON {
        nearest as i64
    } else {
        exact.floor() as i64
    }
}

/// Gain multiplier in `[0, 1]` for a point `elapsed` seconds into a clip.
///
/// Fade-in takes precedence over fade-out when both apply. A zero-length fade
/// is disabled.
pub fn envelope(elapsed: f64, clip_duration: f64, fade_in: f64, fade_out: f64) -> f64 {
    let factor = if fade_in > 0.0 && elapsed < fade_in {
        elapsed / fade_in
    } else if fade_out > 0.0 && elapsed > clip_duration - fade_out {
        1.0 - (elapsed - (clip_duration - fade_out)) / fade_out
    } else {
        1.0
    };
    factor.clamp(0.0, 1.0)
}

/// A clip with its source resolved and its placement converted for mixing.
struct RenderClip<'a> {
    clip: &'a Clip,
    audio: SampleBuffer,
    start: f64,
    end: f64,
}

/// Mix clips down to a single stereo buffer.
///
/// Every source is resolved before any summation starts. Clips whose source
/// cannot be used are skipped and reported in [`MixOutput::skipped`]; the mix
/// fails only when there are no clips or none of them is usable. Sources are
/// never modified.
pub fn mix<'a, P>(
    clips: impl IntoIterator<Item = &'a Clip>,
    sources: &P,
    settings: &MixSettings,
) -> Result<MixOutput, MixError>
where
    P: SourceProvider + ?Sized,
{
    let clips: Vec<&Clip> = clips.into_iter().collect();
    if clips.is_empty() {
        return Err(MixError::EmptyTimeline);
    }

    let mut skipped = Vec::new();
    let mut resolved = Vec::with_capacity(clips.len());

    for clip in &clips {
        match sources.source(&clip.asset) {
            Ok(audio) if audio.is_empty() => skip(&mut skipped, clip, SourceError::Empty(clip.asset.clone())),
            Ok(audio) => resolved.push((*clip, audio)),
            Err(error) => skip(&mut skipped, clip, error),
        }
    }

    let Some(sample_rate) = resolved.first().map(|(_, audio)| audio.sample_rate()) else {
        return Err(MixError::AllSourcesFailed { skipped });
    };

    let mut usable = Vec::with_capacity(resolved.len());
    for (clip, audio) in resolved {
        if audio.sample_rate() == sample_rate {
            usable.push((clip, audio));
            continue;
        }

        match settings.rate_policy {
            RatePolicy::Passthrough => {
                log::warn!(
                    "{} is {} Hz but the mix runs at {} Hz; reading samples unconverted",
                    clip.id,
                    audio.sample_rate(),
                    sample_rate
                );
                usable.push((clip, audio));
            }
            RatePolicy::Resample => match audio.resample(sample_rate) {
                Ok(converted) => usable.push((clip, converted)),
                Err(e) => skip(
                    &mut skipped,
                    clip,
                    SourceError::Decode {
                        asset: clip.asset.clone(),
                        reason: format!("resampling to {sample_rate} Hz failed: {e}"),
                    },
                ),
            },
        }
    }

    let render_clips = place(usable, settings);
    let total_duration = render_clips.iter().map(|rc| rc.end).fold(0.0f64, f64::max);
    let total_frames = seconds_to_frames_ceil(total_duration, sample_rate);

    let mut master = vec![0.0f32; total_frames * OUTPUT_CHANNELS];
    for render_clip in &render_clips {
        sum_clip(&mut master, render_clip, sample_rate, settings);
    }

    let peak = master.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    let headroom = settings.normalization_ceiling();
    let applied_gain = if peak > headroom {
        headroom / peak
    } else {
        1.0
    };
    if applied_gain != 1.0 {
        for sample in &mut master {
            *sample *= applied_gain;
        }
    }

    log::debug!(
        "mixed {} clips ({} skipped): {} frames at {} Hz, peak {:.4}, gain {:.4}",
        render_clips.len(),
        skipped.len(),
        total_frames,
        sample_rate,
        peak,
        applied_gain
    );

    Ok(MixOutput {
        buffer: SampleBuffer::new(master, sample_rate, OUTPUT_CHANNELS as u16),
        peak,
        applied_gain,
        skipped,
    })
}

fn skip(skipped: &mut Vec<SkippedClip>, clip: &Clip, error: SourceError) {
    log::warn!("skipping {} in mix: {}", clip.id, error);
    skipped.push(SkippedClip { clip: clip.id, error });
}

/// Apply offset biases and the sync mode to produce final clip windows.
fn place<'a>(usable: Vec<(&'a Clip, SampleBuffer)>, settings: &MixSettings) -> Vec<RenderClip<'a>> {
    match settings.sync_mode {
        SyncMode::Manual => usable
            .into_iter()
            .map(|(clip, audio)| {
                let start = (clip.start + settings.start_bias).max(0.0);
                let end = (clip.end + settings.end_bias).max(start);
                RenderClip { clip, audio, start, end }
            })
            .collect(),
        SyncMode::Auto => {
            let mut ordered = usable;
            ordered.sort_by(|(a, _), (b, _)| a.start.total_cmp(&b.start).then(a.id.cmp(&b.id)));

            let mut cursor = settings.start_bias.max(0.0);
            ordered
                .into_iter()
                .map(|(clip, audio)| {
                    let start = cursor;
                    let end = start + (clip.window() + settings.end_bias).max(0.0);
                    cursor = end;
                    RenderClip { clip, audio, start, end }
                })
                .collect()
        }
    }
}

fn sum_clip(master: &mut [f32], render_clip: &RenderClip<'_>, sample_rate: u32, settings: &MixSettings) {
    let RenderClip { clip, audio, start, end } = render_clip;
    let total_frames = master.len() / OUTPUT_CHANNELS;

    // Window edges and the source origin share one frame grid, so the two
    // halves of a split meet without a gap or a doubled frame
    let start_index = frame_index(*start, sample_rate);
    let start_frame = start_index.max(0) as usize;
    let window_frames = (frame_index(*end, sample_rate) - start_index).max(0) as usize;
    let origin = frame_index(*start - clip.source_offset.max(0.0), sample_rate);
    let offset_frames = (start_index - origin).max(0) as usize;
    let count = audio.frames().saturating_sub(offset_frames).min(window_frames);

    let source_channels = audio.channels() as usize;
    // Mono feeds both sides; channels past the second are ignored
    let right_channel = if source_channels > 1 { 1 } else { 0 };
    let samples = audio.samples();
    let clip_gain = clip.gain.max(0.0);

    for i in 0..count {
        let dst = start_frame + i;
        if dst >= total_frames {
            break;
        }

        let elapsed = i as f64 / sample_rate as f64;
        let gain = clip_gain * envelope(elapsed, clip.source_duration, settings.fade_in, settings.fade_out) as f32;

        let src = (offset_frames + i) * source_channels;
        master[dst * OUTPUT_CHANNELS] += samples[src] * gain;
        master[dst * OUTPUT_CHANNELS + 1] += samples[src + right_channel] * gain;
    }
}
