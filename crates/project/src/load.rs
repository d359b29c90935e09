use crate::{Project, ProjectError};
use podmix_decode::AudioCache;
use podmix_transport::{AssetId, Clip};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// An asset whose audio could not be loaded. Its clips stay on the timeline
/// and are skipped when mixing.
#[derive(Debug, Clone)]
pub struct OfflineAsset {
    pub asset: AssetId,
    pub path: Option<PathBuf>,
    /// Error message describing why the audio couldn't be loaded
    pub error: String,
}

#[derive(Debug)]
pub struct LoadedProject {
    pub name: String,
    pub max_tracks: usize,
    pub timeline_floor: f64,
    pub clips: Vec<Clip>,
    /// Absolute path of every listed asset
    pub asset_paths: HashMap<AssetId, PathBuf>,
    /// Decoded audio for every asset that loaded
    pub cache: AudioCache,
    pub offline_assets: Vec<OfflineAsset>,
}

#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    pub name: String,
    pub max_tracks: usize,
    pub asset_count: usize,
    pub clip_count: usize,
}

fn load_project_data(path: &Path) -> Result<Project, ProjectError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    // Try JSON first, fall back to MessagePack
    let json = match serde_json::from_reader(reader) {
        Ok(project) => return Ok(project),
        Err(err) => err,
    };

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    rmp_serde::decode::from_read(reader).map_err(|msgpack| {
        log::debug!("{} is not JSON ({json}) or MessagePack ({msgpack})", path.display());
        ProjectError::UnrecognizedFormat { json, msgpack }
    })
}

/// Read project metadata without decoding any audio.
pub fn load_project_metadata(path: &Path) -> Result<ProjectMetadata, ProjectError> {
    let project = load_project_data(path)?;

    Ok(ProjectMetadata {
        name: project.name,
        max_tracks: project.max_tracks,
        asset_count: project.assets.len(),
        clip_count: project.clips.len(),
    })
}

/// Load a project and decode its assets.
///
/// Missing or undecodable audio does not fail the load; such assets are
/// listed in [`LoadedProject::offline_assets`].
pub fn load_project(path: &Path) -> Result<LoadedProject, ProjectError> {
    let project = load_project_data(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut cache = AudioCache::new();
    let mut asset_paths = HashMap::new();
    let mut offline_assets = Vec::new();

    for asset in &project.assets {
        let resolved = if asset.path.is_absolute() {
            asset.path.clone()
        } else {
            base_dir.join(&asset.path)
        };

        if let Err(e) = cache.load(asset.id.clone(), &resolved) {
            offline_assets.push(OfflineAsset {
                asset: asset.id.clone(),
                path: Some(resolved.clone()),
                error: e.to_string(),
            });
        }
        asset_paths.insert(asset.id.clone(), resolved);
    }

    for clip in &project.clips {
        let listed = asset_paths.contains_key(&clip.asset);
        let reported = offline_assets.iter().any(|o| o.asset == clip.asset);
        if !listed && !reported {
            offline_assets.push(OfflineAsset {
                asset: clip.asset.clone(),
                path: None,
                error: format!("asset '{}' is not listed in the project", clip.asset),
            });
        }
    }

    for offline in &offline_assets {
        log::warn!("asset {} is offline: {}", offline.asset, offline.error);
    }
    log::info!(
        "loaded project '{}': {} clips, {} assets ({} offline)",
        project.name,
        project.clips.len(),
        project.assets.len(),
        offline_assets.len()
    );

    Ok(LoadedProject {
        name: project.name,
        max_tracks: project.max_tracks,
        timeline_floor: project.timeline_floor,
        clips: project.clips.into_iter().map(Clip::from).collect(),
        asset_paths,
        cache,
        offline_assets,
    })
}
