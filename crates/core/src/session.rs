use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use podmix_decode::AudioCache;
use podmix_project::{OfflineAsset, Project, ProjectError, load_project, save_project};
use podmix_render::{MixError, MixOutput, encode_wav, mix, write_wav};
use podmix_transport::{AssetId, ClipId, SampleBuffer, peaks};

use crate::config::EngineConfig;
use crate::time::Viewport;
use crate::timeline::{Timeline, TimelineError};

pub const DEFAULT_CANVAS_WIDTH: u32 = 1200;

/// An open editing session: configuration, timeline, viewport and the
/// decoded audio behind the clips.
pub struct Session {
    config: EngineConfig,
    timeline: Timeline,
    viewport: Viewport,
    cache: AudioCache,
    asset_paths: HashMap<AssetId, PathBuf>,
    offline_assets: Vec<OfflineAsset>,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let timeline = config.timeline();
        let viewport = config.viewport(DEFAULT_CANVAS_WIDTH, timeline.duration());

        Self {
            config,
            timeline,
            viewport,
            cache: AudioCache::new(),
            asset_paths: HashMap::new(),
            offline_assets: Vec::new(),
        }
    }

    /// Open a saved project. The project's lane count and floor override
    /// those in `config`.
    pub fn from_project(path: &Path, config: EngineConfig) -> anyhow::Result<Self> {
        let loaded = load_project(path).with_context(|| format!("failed to load project {}", path.display()))?;

        let config = EngineConfig {
            max_tracks: loaded.max_tracks,
            timeline_floor_seconds: loaded.timeline_floor,
            ..config
        };
        let mut session = Self::new(config);

        for clip in loaded.clips {
            let id = clip.id;
            if let Err(e) = session.timeline.insert(clip) {
                log::warn!("dropping {id} from {}: {e}", path.display());
            }
        }

        session.cache = loaded.cache;
        session.asset_paths = loaded.asset_paths;
        session.offline_assets = loaded.offline_assets;
        session.sync_viewport();
        Ok(session)
    }

    /// Decode an audio file and place it at `start` on a free track.
    pub fn import_file(&mut self, path: &Path, start: f64) -> anyhow::Result<ClipId> {
        let asset = AssetId::new(path.to_string_lossy());
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| asset.to_string());

        let buffer = self
            .cache
            .load(asset.clone(), path)
            .with_context(|| format!("failed to import {}", path.display()))?;

        let id = self.timeline.add_clip(asset.clone(), name, buffer.duration_secs(), start)?;
        self.asset_paths.insert(asset, path.to_path_buf());
        self.sync_viewport();
        Ok(id)
    }

    /// Place already decoded audio on a free track.
    pub fn add_buffer(
        &mut self,
        asset: AssetId,
        name: impl Into<String>,
        buffer: SampleBuffer,
        start: f64,
    ) -> Result<ClipId, TimelineError> {
        let id = self.timeline.add_clip(asset.clone(), name, buffer.duration_secs(), start)?;
        self.cache.insert(asset, buffer);
        self.sync_viewport();
        Ok(id)
    }

    pub fn move_clip(&mut self, id: ClipId, delta: f64) -> Result<(), TimelineError> {
        self.timeline.move_clip(id, delta)?;
        self.sync_viewport();
        Ok(())
    }

    pub fn move_clip_to_track(&mut self, id: ClipId, track: usize) -> Result<(), TimelineError> {
        self.timeline.move_clip_to_track(id, track)
    }

    pub fn split_clip(&mut self, id: ClipId) -> Result<(ClipId, ClipId), TimelineError> {
        self.timeline.split_clip(id)
    }

    pub fn duplicate_clip(&mut self, id: ClipId) -> Result<ClipId, TimelineError> {
        self.timeline.duplicate_clip(id)
    }

    pub fn delete_clip(&mut self, id: ClipId) -> Result<(), TimelineError> {
        self.timeline.delete_clip(id)?;
        self.sync_viewport();
        Ok(())
    }

    pub fn set_clip_gain(&mut self, id: ClipId, gain: f32) -> Result<(), TimelineError> {
        self.timeline.set_gain(id, gain)
    }

    pub fn mix(&self) -> Result<MixOutput, MixError> {
        mix(self.timeline.clips(), &self.cache, &self.config.mix_settings())
    }

    pub fn encode_wav(&self) -> anyhow::Result<Vec<u8>> {
        let output = self.mix()?;
        Ok(encode_wav(&output.buffer)?)
    }

    pub fn export_wav(&self, path: &Path) -> anyhow::Result<MixOutput> {
        let output = self.mix()?;
        write_wav(&output.buffer, path)?;
        Ok(output)
    }

    /// Peak envelope of an asset's first channel, `width` values wide.
    pub fn waveform(&self, asset: &AssetId, width: usize) -> Option<Vec<f32>> {
        self.cache.get(asset).map(|buffer| peaks(buffer, width))
    }

    /// Save clips that came from files. Clips added from in-memory buffers
    /// have no file to point at and are left out.
    pub fn save_project(&self, path: &Path, name: &str) -> Result<(), ProjectError> {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let project = Project::capture(
            name,
            self.timeline.max_tracks(),
            self.timeline.floor(),
            self.timeline.clips(),
            &self.asset_paths,
            base_dir,
        );
        save_project(path, &project)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    /// Assets that could not be loaded when the project was opened.
    pub fn offline_assets(&self) -> &[OfflineAsset] {
        &self.offline_assets
    }

    fn sync_viewport(&mut self) {
        self.viewport.set_duration(self.timeline.duration());
    }
}
