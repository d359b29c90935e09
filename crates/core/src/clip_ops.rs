//! Pure functions for clip edits, testable without a timeline.

use podmix_transport::{Clip, ClipId};

/// Shift a clip's window by `delta` seconds, clamping so it never starts
/// before zero. Window length is preserved.
pub fn shift(clip: &Clip, delta: f64) -> Clip {
    let applied = delta.max(-clip.start);
    if applied != delta {
        log::debug!("{} move clamped: {delta:.6}s -> {applied:.6}s", clip.id);
    }

    let mut moved = clip.clone();
    moved.start = clip.start + applied;
    moved.end = moved.start + clip.window();
    moved
}

/// Split a clip at `at` seconds.
///
/// The first half keeps the clip's id and track; the second half gets
/// `second_id` and `second_track` and reads the source from where the first
/// half stops. Caller guarantees `clip.start < at < clip.end`.
pub fn split_at(clip: &Clip, at: f64, second_id: ClipId, second_track: usize) -> (Clip, Clip) {
    let mut first = clip.clone();
    first.end = at;

    let mut second = clip.clone();
    second.id = second_id;
    second.track = second_track;
    second.start = at;
    second.source_offset = clip.source_offset + (at - clip.start);

    (first, second)
}

/// Copy a clip under a new id and track, keeping window, offset, gain and
/// effects.
pub fn duplicate(clip: &Clip, id: ClipId, track: usize) -> Clip {
    let mut copy = clip.clone();
    copy.id = id;
    copy.track = track;
    copy
}

/// Latest window end, or 0 with no clips.
pub fn content_end<'a>(clips: impl IntoIterator<Item = &'a Clip>) -> f64 {
    clips.into_iter().map(|clip| clip.end).fold(0.0, f64::max)
}

/// Pairs of clips sharing a track whose windows overlap, lower id first.
pub fn overlapping_pairs<'a>(clips: impl IntoIterator<Item = &'a Clip>) -> Vec<(ClipId, ClipId)> {
    let mut clips: Vec<&Clip> = clips.into_iter().collect();
    clips.sort_by_key(|clip| clip.id);

    let mut pairs = Vec::new();
    for (i, a) in clips.iter().enumerate() {
        for b in &clips[i + 1..] {
            if a.track == b.track && a.overlaps(b) {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use podmix_transport::{AssetId, Effect, GainParams};

    fn make_clip(id: u64, track: usize, start: f64, duration: f64) -> Clip {
        Clip::new(ClipId(id), AssetId::new("voice"), format!("Clip {id}"), track, start, duration)
    }

    #[test]
    fn test_shift_preserves_window() {
        let clip = make_clip(1, 0, 2.0, 3.0);
        let moved = shift(&clip, 1.5);

        assert_eq!(moved.start, 3.5);
        assert_eq!(moved.end, 6.5);
        assert_eq!(moved.window(), clip.window());
    }

    #[test]
    fn test_shift_clamps_at_zero() {
        let clip = make_clip(1, 0, 2.0, 3.0);
        let moved = shift(&clip, -10.0);

        assert_eq!(moved.start, 0.0);
        assert_eq!(moved.end, 3.0);
    }

    #[test]
    fn test_split_at_continues_source() {
        let mut clip = make_clip(1, 2, 4.0, 6.0);
        clip.gain = 0.7;
        clip.effects = vec![Effect::Gain(GainParams { db: -1.0 })];

        let (first, second) = split_at(&clip, 6.0, ClipId(9), 5);

        assert_eq!(first.id, ClipId(1));
        assert_eq!(first.track, 2);
        assert_eq!((first.start, first.end), (4.0, 6.0));
        assert_eq!(first.source_offset, 0.0);

        assert_eq!(second.id, ClipId(9));
        assert_eq!(second.track, 5);
        assert_eq!((second.start, second.end), (6.0, 10.0));
        assert_eq!(second.source_offset, 2.0);
        assert_eq!(second.gain, 0.7);
        assert_eq!(second.effects, clip.effects);
        assert_eq!(second.source_duration, clip.source_duration);
    }

    #[test]
    fn test_split_of_split_accumulates_offset() {
        let clip = make_clip(1, 0, 0.0, 8.0);
        let (_, second) = split_at(&clip, 4.0, ClipId(2), 1);
        let (_, third) = split_at(&second, 6.0, ClipId(3), 2);

        assert_eq!(third.source_offset, 6.0);
        assert_eq!((third.start, third.end), (6.0, 8.0));
    }

    #[test]
    fn test_duplicate_keeps_window() {
        let mut clip = make_clip(1, 0, 1.0, 2.0);
        clip.source_offset = 0.5;

        let copy = duplicate(&clip, ClipId(4), 3);

        assert_eq!(copy.id, ClipId(4));
        assert_eq!(copy.track, 3);
        assert_eq!((copy.start, copy.end), (clip.start, clip.end));
        assert_eq!(copy.source_offset, 0.5);
    }

    #[test]
    fn test_content_end() {
        let clips = vec![make_clip(1, 0, 0.0, 5.0), make_clip(2, 1, 3.0, 5.0)];

        assert_eq!(content_end(&clips), 8.0);
        assert_eq!(content_end(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_overlapping_pairs_same_track_only() {
        let clips = vec![
            make_clip(3, 0, 4.0, 2.0),
            make_clip(1, 0, 0.0, 5.0),
            make_clip(2, 1, 0.0, 5.0),
            make_clip(4, 0, 5.0, 1.0),
        ];

        assert_eq!(
            overlapping_pairs(&clips),
            vec![(ClipId(1), ClipId(3)), (ClipId(3), ClipId(4))]
        );
    }
}
