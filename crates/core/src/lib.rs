pub mod clip_ops;
pub mod config;
pub mod lanes;
pub mod session;
pub mod time;
pub mod timeline;

pub use config::{ConfigError, EngineConfig};
pub use lanes::{AllocationPolicy, TrackAllocator};
pub use session::Session;
pub use time::Viewport;
pub use timeline::{Timeline, TimelineError};

pub use podmix_decode::{AudioCache, decode_file};
pub use podmix_project::{LoadedProject, OfflineAsset, Project, ProjectError, load_project, save_project};
pub use podmix_render::{
    MixError, MixOutput, MixSettings, RatePolicy, SkippedClip, SyncMode, WavError, encode_wav, mix,
    write_wav,
};
pub use podmix_transport::{AssetId, Clip, ClipId, Effect, SampleBuffer, SourceError, SourceProvider, peaks};
