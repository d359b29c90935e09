//! Offline mixdown of timeline clips and PCM WAV serialization.

mod mix;
mod settings;
mod wav;

pub use mix::{
    MixError, MixOutput, SkippedClip, envelope, mix, seconds_to_frames_ceil,
    seconds_to_frames_floor,
};
pub use settings::{DEFAULT_HEADROOM, MixSettings, RatePolicy, SyncMode};
pub use wav::{WAV_HEADER_LEN, WavError, encode_wav, quantize, write_wav};
