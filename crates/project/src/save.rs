use crate::{AssetData, ClipData, Project, ProjectError};
use podmix_transport::{AssetId, Clip};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

impl Project {
    /// Capture clips and the asset files behind them.
    ///
    /// Asset paths under `base_dir` are stored relative to it so the project
    /// can move together with its audio. Clips whose asset has no known path
    /// are left out.
    pub fn capture<'a>(
        name: impl Into<String>,
        max_tracks: usize,
        timeline_floor: f64,
        clips: impl IntoIterator<Item = &'a Clip>,
        asset_paths: &HashMap<AssetId, PathBuf>,
        base_dir: &Path,
    ) -> Self {
        let mut used = BTreeSet::new();
        let clips: Vec<ClipData> = clips
            .into_iter()
            .filter(|clip| {
                let known = asset_paths.contains_key(&clip.asset);
                if !known {
                    log::warn!("{} ({}) has no asset path; not saved", clip.id, clip.asset);
                }
                known
            })
            .map(|clip| {
                used.insert(clip.asset.clone());
                ClipData::from(clip)
            })
            .collect();

        let assets = used
            .into_iter()
            .filter_map(|id| {
                let path = asset_paths.get(&id)?;
                let stored = path
                    .strip_prefix(base_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.clone());
                Some(AssetData { id, path: stored })
            })
            .collect();

        Self {
            name: name.into(),
            max_tracks,
            timeline_floor,
            assets,
            clips,
        }
    }
}

/// Write the project as pretty-printed JSON.
pub fn save_project(path: &Path, project: &Project) -> Result<(), ProjectError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, project)?;

    log::info!("saved project '{}' to {}", project.name, path.display());
    Ok(())
}

/// Write the project as MessagePack with named fields.
pub fn save_project_msgpack(path: &Path, project: &Project) -> Result<(), ProjectError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write_named(&mut writer, project)?;

    log::info!("saved project '{}' to {}", project.name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use podmix_transport::ClipId;
    use tempfile::tempdir;

    fn clips() -> Vec<Clip> {
        vec![
            Clip::new(ClipId(1), AssetId::new("host"), "Host", 0, 0.0, 10.0),
            Clip::new(ClipId(2), AssetId::new("guest"), "Guest", 1, 5.0, 10.0),
            Clip::new(ClipId(3), AssetId::new("host"), "Host again", 2, 20.0, 10.0),
            Clip::new(ClipId(4), AssetId::new("scratch"), "Unsaved", 3, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_capture_relativizes_paths() {
        let base = Path::new("/shows/ep1");
        let mut asset_paths = HashMap::new();
        asset_paths.insert(AssetId::new("host"), PathBuf::from("/shows/ep1/audio/host.wav"));
        asset_paths.insert(AssetId::new("guest"), PathBuf::from("/elsewhere/guest.wav"));

        let clips = clips();
        let project = Project::capture("Ep 1", 8, 60.0, &clips, &asset_paths, base);

        assert_eq!(project.clips.len(), 3);
        assert!(project.clips.iter().all(|c| c.asset.as_str() != "scratch"));
        assert_eq!(project.assets.len(), 2);

        let host = project.assets.iter().find(|a| a.id.as_str() == "host").unwrap();
        assert_eq!(host.path, PathBuf::from("audio/host.wav"));
        let guest = project.assets.iter().find(|a| a.id.as_str() == "guest").unwrap();
        assert_eq!(guest.path, PathBuf::from("/elsewhere/guest.wav"));
    }

    #[test]
    fn test_save_writes_pretty_json() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("episode.podmix");
        let project = Project {
            name: "Pretty".to_string(),
            max_tracks: 4,
            timeline_floor: 30.0,
            assets: vec![],
            clips: vec![],
        };

        save_project(&path, &project).expect("save");

        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\n"));
        assert!(text.contains("\"name\": \"Pretty\""));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("no/such/dir/episode.podmix");
        let project = Project {
            name: "Nowhere".to_string(),
            max_tracks: 4,
            timeline_floor: 30.0,
            assets: vec![],
            clips: vec![],
        };

        assert!(matches!(save_project(&path, &project), Err(ProjectError::Io(_))));
    }
}
