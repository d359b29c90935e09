use serde::{Deserialize, Serialize};

use crate::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Identifies a decoded source asset. Clips refer to audio by asset id and
/// never own sample data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A placed instance of an asset on the timeline.
///
/// The placement window `[start, end)` is independent of the source length:
/// mixing reads at most `min(source frames after offset, window frames)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub id: ClipId,
    pub asset: AssetId,
    /// Display name for UI
    pub name: String,
    pub track: usize,
    /// Window start in seconds
    pub start: f64,
    /// Window end in seconds
    pub end: f64,
    /// Intrinsic duration of the decoded source in seconds
    pub source_duration: f64,
    /// Seconds into the source where the window begins (non-zero after a split)
    pub source_offset: f64,
    /// Linear gain
    pub gain: f32,
    pub effects: Vec<Effect>,
}

impl Clip {
    /// A clip whose window covers the whole source starting at `start`.
    pub fn new(id: ClipId, asset: AssetId, name: impl Into<String>, track: usize, start: f64, source_duration: f64) -> Self {
        Self {
            id,
            asset,
            name: name.into(),
            track,
            start,
            end: start + source_duration,
            source_duration,
            source_offset: 0.0,
            gain: 1.0,
            effects: Vec::new(),
        }
    }

    /// Length of the placement window in seconds
    pub fn window(&self) -> f64 {
        self.end - self.start
    }

    /// Midpoint of the placement window
    pub fn midpoint(&self) -> f64 {
        self.start + self.window() / 2.0
    }

    /// Half-open interval overlap test against another clip's window.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start < other.end && other.start < self.end
    }
}
