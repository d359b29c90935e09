//! Shared audio data types: decoded sample buffers, the clip model, effect
//! descriptors, and the read-only transforms built on them.

mod buffer;
mod clip;
mod effect;
mod resample;
mod source;
mod waveform;

pub use buffer::SampleBuffer;
pub use clip::{AssetId, Clip, ClipId};
pub use effect::{
    CompressorParams, Effect, EqualizerParams, GainParams, NoiseGateParams, ReverbParams,
};
pub use resample::resample_buffer;
pub use source::{SourceError, SourceProvider};
pub use waveform::peaks;
