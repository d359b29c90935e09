use std::collections::{BTreeMap, BTreeSet};

use podmix_transport::{AssetId, Clip, ClipId, Effect};

use crate::clip_ops;
use crate::lanes::{AllocationPolicy, TrackAllocator};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("{0} not found")]
    ClipNotFound(ClipId),

    #[error("{0} already exists")]
    DuplicateClip(ClipId),

    #[error("track {track} is outside 0..{max_tracks}")]
    TrackOutOfRange { track: usize, max_tracks: usize },

    #[error("all {max_tracks} tracks are occupied")]
    NoFreeTrack { max_tracks: usize },

    #[error("invalid clip window {start}..{end}")]
    InvalidWindow { start: f64, end: f64 },

    #[error("cannot split {clip} at {at}s: outside its window")]
    InvalidSplit { clip: ClipId, at: f64 },
}

/// Clips placed on a bounded set of lanes.
///
/// Every edit builds the replacement clips first and only then touches the
/// clip map, so a failed edit leaves the timeline unchanged.
#[derive(Debug, Clone)]
pub struct Timeline {
    clips: BTreeMap<ClipId, Clip>,
    next_id: u64,
    allocator: TrackAllocator,
    floor: f64,
}

impl Timeline {
    pub fn new(max_tracks: usize, floor: f64) -> Self {
        Self {
            clips: BTreeMap::new(),
            next_id: 1,
            allocator: TrackAllocator::new(max_tracks),
            floor: floor.max(0.0),
        }
    }

    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.allocator = self.allocator.with_policy(policy);
        self
    }

    pub fn max_tracks(&self) -> usize {
        self.allocator.max_tracks()
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn allocator(&self) -> &TrackAllocator {
        &self.allocator
    }

    /// Place a new clip covering its whole source on the lowest free track.
    pub fn add_clip(
        &mut self,
        asset: AssetId,
        name: impl Into<String>,
        source_duration: f64,
        start: f64,
    ) -> Result<ClipId, TimelineError> {
        check_window(start, start + source_duration)?;
        let track = self.allocator.allocate(self.clips.values())?;
        Ok(self.commit_new(asset, name.into(), source_duration, start, track))
    }

    pub fn add_clip_on_track(
        &mut self,
        asset: AssetId,
        name: impl Into<String>,
        source_duration: f64,
        start: f64,
        track: usize,
    ) -> Result<ClipId, TimelineError> {
        check_window(start, start + source_duration)?;
        self.check_track(track)?;
        Ok(self.commit_new(asset, name.into(), source_duration, start, track))
    }

    /// Insert a clip exactly as given, e.g. when restoring a saved project.
    pub fn insert(&mut self, clip: Clip) -> Result<ClipId, TimelineError> {
        check_window(clip.start, clip.end)?;
        self.check_track(clip.track)?;
        if self.clips.contains_key(&clip.id) {
            return Err(TimelineError::DuplicateClip(clip.id));
        }

        let id = clip.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Shift a clip in time. Moves that would start before zero are clamped.
    pub fn move_clip(&mut self, id: ClipId, delta: f64) -> Result<(), TimelineError> {
        let moved = clip_ops::shift(self.get(id)?, delta);
        self.clips.insert(id, moved);
        Ok(())
    }

    pub fn move_clip_to_track(&mut self, id: ClipId, track: usize) -> Result<(), TimelineError> {
        self.check_track(track)?;
        self.get_mut(id)?.track = track;
        Ok(())
    }

    /// Negative gains are clamped to silence.
    pub fn set_gain(&mut self, id: ClipId, gain: f32) -> Result<(), TimelineError> {
        self.get_mut(id)?.gain = gain.max(0.0);
        Ok(())
    }

    pub fn set_effects(&mut self, id: ClipId, effects: Vec<Effect>) -> Result<(), TimelineError> {
        self.get_mut(id)?.effects = effects;
        Ok(())
    }

    pub fn delete_clip(&mut self, id: ClipId) -> Result<Clip, TimelineError> {
        self.clips.remove(&id).ok_or(TimelineError::ClipNotFound(id))
    }

    /// Copy a clip onto the lowest free track under a fresh id.
    pub fn duplicate_clip(&mut self, id: ClipId) -> Result<ClipId, TimelineError> {
        let clip = self.get(id)?;
        let track = self.allocator.allocate(self.clips.values())?;
        let copy = clip_ops::duplicate(clip, ClipId(self.next_id), track);

        let new_id = copy.id;
        self.next_id += 1;
        self.clips.insert(new_id, copy);
        Ok(new_id)
    }

    /// Split a clip at the middle of its window.
    pub fn split_clip(&mut self, id: ClipId) -> Result<(ClipId, ClipId), TimelineError> {
        let at = self.get(id)?.midpoint();
        self.split_clip_at(id, at)
    }

    /// Split a clip at `at` seconds.
    ///
    /// The original id keeps the first half on its track. The second half
    /// gets a new id and a newly allocated track and continues the source
    /// where the first half stops.
    pub fn split_clip_at(&mut self, id: ClipId, at: f64) -> Result<(ClipId, ClipId), TimelineError> {
        let clip = self.get(id)?;
        if !(at > clip.start && at < clip.end) {
            return Err(TimelineError::InvalidSplit { clip: id, at });
        }

        let track = self.allocator.allocate(self.clips.values())?;
        let (first, second) = clip_ops::split_at(clip, at, ClipId(self.next_id), track);

        let second_id = second.id;
        self.next_id += 1;
        self.clips.insert(id, first);
        self.clips.insert(second_id, second);
        Ok((id, second_id))
    }

    /// Timeline length: the latest clip end, never shorter than the floor.
    pub fn duration(&self) -> f64 {
        self.content_end().max(self.floor)
    }

    pub fn content_end(&self) -> f64 {
        clip_ops::content_end(self.clips.values())
    }

    pub fn occupied_tracks(&self) -> BTreeSet<usize> {
        self.allocator.occupied(self.clips.values())
    }

    pub fn is_track_occupied(&self, track: usize) -> bool {
        self.allocator.is_occupied(self.clips.values(), track)
    }

    /// All clips in id order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    pub fn clips_on_track(&self, track: usize) -> impl Iterator<Item = &Clip> {
        self.clips.values().filter(move |clip| clip.track == track)
    }

    /// Same-track clips whose windows overlap. Overlap is allowed; this only
    /// reports it.
    pub fn overlaps(&self) -> Vec<(ClipId, ClipId)> {
        clip_ops::overlapping_pairs(self.clips.values())
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn get(&self, id: ClipId) -> Result<&Clip, TimelineError> {
        self.clips.get(&id).ok_or(TimelineError::ClipNotFound(id))
    }

    fn get_mut(&mut self, id: ClipId) -> Result<&mut Clip, TimelineError> {
        self.clips.get_mut(&id).ok_or(TimelineError::ClipNotFound(id))
    }

    fn check_track(&self, track: usize) -> Result<(), TimelineError> {
        if self.allocator.contains(track) {
            Ok(())
        } else {
            Err(TimelineError::TrackOutOfRange {
                track,
                max_tracks: self.max_tracks(),
            })
        }
    }

    fn commit_new(&mut self, asset: AssetId, name: String, source_duration: f64, start: f64, track: usize) -> ClipId {
        let id = ClipId(self.next_id);
        self.next_id += 1;
        self.clips
            .insert(id, Clip::new(id, asset, name, track, start, source_duration));
        id
    }
}

fn check_window(start: f64, end: f64) -> Result<(), TimelineError> {
    if start.is_finite() && end.is_finite() && start >= 0.0 && end >= start {
        Ok(())
    } else {
        Err(TimelineError::InvalidWindow { start, end })
    }
}
