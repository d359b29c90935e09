use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use podmix_render::{DEFAULT_HEADROOM, MixSettings, RatePolicy, SyncMode};
use serde::{Deserialize, Serialize};

use crate::lanes::AllocationPolicy;
use crate::time::{MAX_ZOOM, MIN_ZOOM, Viewport};
use crate::timeline::Timeline;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine settings read from `engine.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_tracks: usize,
    pub fade_in_seconds: f64,
    pub fade_out_seconds: f64,
    /// Minimum timeline length shown when there is little or no content
    pub timeline_floor_seconds: f64,
    pub normalization_headroom: f32,
    pub track_policy: AllocationPolicy,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub start_bias_seconds: f64,
    pub end_bias_seconds: f64,
    pub sync_mode: SyncMode,
    pub rate_policy: RatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tracks: 8,
            fade_in_seconds: 0.0,
            fade_out_seconds: 0.0,
            timeline_floor_seconds: 60.0,
            normalization_headroom: DEFAULT_HEADROOM,
            track_policy: AllocationPolicy::Strict,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            start_bias_seconds: 0.0,
            end_bias_seconds: 0.0,
            sync_mode: SyncMode::Manual,
            rate_policy: RatePolicy::Passthrough,
        }
    }
}

impl EngineConfig {
    /// `<config dir>/podmix/engine.toml`, when the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("podmix").join("engine.toml"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load `path`, falling back to defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn mix_settings(&self) -> MixSettings {
        MixSettings {
            fade_in: self.fade_in_seconds.max(0.0),
            fade_out: self.fade_out_seconds.max(0.0),
            start_bias: self.start_bias_seconds,
            end_bias: self.end_bias_seconds,
            sync_mode: self.sync_mode,
            headroom: self.normalization_headroom,
            rate_policy: self.rate_policy,
        }
    }

    /// An empty timeline with this config's lane count, floor and policy.
    pub fn timeline(&self) -> Timeline {
        Timeline::new(self.max_tracks, self.timeline_floor_seconds).with_policy(self.track_policy)
    }

    pub fn viewport(&self, canvas_width: u32, duration: f64) -> Viewport {
        Viewport::new(canvas_width, duration).with_zoom_range(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            max_tracks = 4
            fade_out_seconds = 1.5
            track_policy = "permissive"
            sync_mode = "auto"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_tracks, 4);
        assert_eq!(config.fade_out_seconds, 1.5);
        assert_eq!(config.track_policy, AllocationPolicy::Permissive);
        assert_eq!(config.sync_mode, SyncMode::Auto);
        assert_eq!(config.fade_in_seconds, 0.0);
        assert_eq!(config.normalization_headroom, DEFAULT_HEADROOM);
        assert_eq!(config.rate_policy, RatePolicy::Passthrough);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = EngineConfig::from_toml_str("max_tracks = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/engine.toml");
        let config = EngineConfig {
            max_tracks: 12,
            normalization_headroom: 0.9,
            rate_policy: RatePolicy::Resample,
            ..EngineConfig::default()
        };

        config.save(&path).expect("save");
        let loaded = EngineConfig::load(&path).expect("load");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempdir().expect("tempdir");

        let missing = EngineConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(missing, EngineConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "max_tracks = [").expect("write");
        assert_eq!(EngineConfig::load_or_default(&broken), EngineConfig::default());
    }

    #[test]
    fn test_mix_settings_from_config() {
        let config = EngineConfig {
            fade_in_seconds: 0.5,
            fade_out_seconds: -1.0,
            start_bias_seconds: 0.25,
            normalization_headroom: 0.8,
            ..EngineConfig::default()
        };

        let settings = config.mix_settings();

        assert_eq!(settings.fade_in, 0.5);
        assert_eq!(settings.fade_out, 0.0);
        assert_eq!(settings.start_bias, 0.25);
        assert_eq!(settings.headroom, 0.8);
    }

    #[test]
    fn test_timeline_and_viewport_from_config() {
        let config = EngineConfig {
            max_tracks: 3,
            timeline_floor_seconds: 20.0,
            max_zoom: 2.0,
            ..EngineConfig::default()
        };

        let timeline = config.timeline();
        assert_eq!(timeline.max_tracks(), 3);
        assert_eq!(timeline.duration(), 20.0);

        let mut viewport = config.viewport(1000, timeline.duration());
        viewport.zoom_around(10.0, 0.0);
        assert_eq!(viewport.zoom(), 2.0);
    }

    #[test]
    fn test_user_config_path_location() {
        if let Some(path) = EngineConfig::user_config_path() {
            assert!(path.ends_with("podmix/engine.toml"));
        }
    }
}
