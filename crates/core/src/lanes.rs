use std::collections::BTreeSet;

use podmix_transport::Clip;
use serde::{Deserialize, Serialize};

use crate::timeline::TimelineError;

/// Lane handed out by [`AllocationPolicy::Permissive`] when every lane is taken.
pub const FALLBACK_TRACK: usize = 0;

/// What [`TrackAllocator::allocate`] does when every lane is occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Fail with [`TimelineError::NoFreeTrack`].
    #[default]
    Strict,
    /// Share [`FALLBACK_TRACK`] with whatever is already there.
    Permissive,
}

/// Picks lanes for new clips. Occupancy is always derived from the clips
/// passed in, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackAllocator {
    max_tracks: usize,
    policy: AllocationPolicy,
}

impl TrackAllocator {
    /// `max_tracks` is raised to 1 if zero.
    pub fn new(max_tracks: usize) -> Self {
        Self {
            max_tracks: max_tracks.max(1),
            policy: AllocationPolicy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_tracks(&self) -> usize {
        self.max_tracks
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    pub fn contains(&self, track: usize) -> bool {
        track < self.max_tracks
    }

    pub fn occupied<'a>(&self, clips: impl IntoIterator<Item = &'a Clip>) -> BTreeSet<usize> {
        clips.into_iter().map(|clip| clip.track).collect()
    }

    pub fn is_occupied<'a>(&self, clips: impl IntoIterator<Item = &'a Clip>, track: usize) -> bool {
        clips.into_iter().any(|clip| clip.track == track)
    }

    /// Lowest lane in `[0, max_tracks)` that no clip uses.
    pub fn allocate<'a>(&self, clips: impl IntoIterator<Item = &'a Clip>) -> Result<usize, TimelineError> {
        let occupied = self.occupied(clips);
        if let Some(free) = (0..self.max_tracks).find(|track| !occupied.contains(track)) {
            return Ok(free);
        }

        match self.policy {
            AllocationPolicy::Strict => Err(TimelineError::NoFreeTrack {
                max_tracks: self.max_tracks,
            }),
            AllocationPolicy::Permissive => {
                log::warn!(
                    "all {} tracks occupied; placing clip on track {} alongside existing clips",
                    self.max_tracks,
                    FALLBACK_TRACK
                );
                Ok(FALLBACK_TRACK)
            }
        }
    }
}
