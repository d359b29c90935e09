mod load;
mod save;

use podmix_transport::{AssetId, Clip, ClipId, Effect};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use load::{LoadedProject, OfflineAsset, ProjectMetadata, load_project, load_project_metadata};
pub use save::{save_project, save_project_msgpack};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub max_tracks: usize,
    pub timeline_floor: f64,
    pub assets: Vec<AssetData>,
    pub clips: Vec<ClipData>,
}

/// Where an asset's audio lives. Relative paths resolve against the project
/// file's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetData {
    pub id: AssetId,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    pub id: u64,
    pub asset: AssetId,
    pub name: String,
    pub track: usize,
    pub start: f64,
    pub end: f64,
    pub source_duration: f64,
    #[serde(default)]
    pub source_offset: f64,
    #[serde(default = "unity_gain")]
    pub gain: f32,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

fn unity_gain() -> f32 {
    1.0
}

impl From<&Clip> for ClipData {
    fn from(clip: &Clip) -> Self {
        Self {
            id: clip.id.0,
            asset: clip.asset.clone(),
            name: clip.name.clone(),
            track: clip.track,
            start: clip.start,
            end: clip.end,
            source_duration: clip.source_duration,
            source_offset: clip.source_offset,
            gain: clip.gain,
            effects: clip.effects.clone(),
        }
    }
}

impl From<ClipData> for Clip {
    fn from(data: ClipData) -> Self {
        Clip {
            id: ClipId(data.id),
            asset: data.asset,
            name: data.name,
            track: data.track,
            start: data.start,
            end: data.end,
            source_duration: data.source_duration,
            source_offset: data.source_offset,
            gain: data.gain,
            effects: data.effects,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),

    /// The file parsed as neither JSON nor MessagePack.
    #[error("unrecognized project format (as JSON: {json}; as MessagePack: {msgpack})")]
    UnrecognizedFormat {
        json: serde_json::Error,
        msgpack: rmp_serde::decode::Error,
    },
}
