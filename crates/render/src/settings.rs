use serde::{Deserialize, Serialize};

/// Default ceiling for the mixed peak, just under full scale.
pub const DEFAULT_HEADROOM: f32 = 0.95;

/// How clips are positioned when mixing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Use each clip's stored window.
    #[default]
    Manual,
    /// Lay clips back to back in timeline order, ignoring stored start times.
    Auto,
}

/// What to do with a source whose sample rate differs from the output rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Read samples as-is; the clip plays at the wrong speed and pitch.
    #[default]
    Passthrough,
    /// Resample to the output rate before summing.
    Resample,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixSettings {
    pub fade_in: f64,
    pub fade_out: f64,
    /// Added to every clip's start before mixing
    pub start_bias: f64,
    /// Added to every clip's end before mixing
    pub end_bias: f64,
    pub sync_mode: SyncMode,
    pub headroom: f32,
    pub rate_policy: RatePolicy,
}

impl MixSettings {
    /// Peak ceiling used for normalization: `headroom` limited to `(0, 1]`.
    /// Non-positive or non-finite values fall back to [`DEFAULT_HEADROOM`].
    pub fn normalization_ceiling(&self) -> f32 {
        if self.headroom.is_finite() && self.headroom > 0.0 {
            self.headroom.min(1.0)
        } else {
            log::warn!(
                "invalid normalization headroom {}; using {}",
                self.headroom,
                DEFAULT_HEADROOM
            );
            DEFAULT_HEADROOM
        }
    }

    pub fn with_fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            fade_in: 0.0,
            fade_out: 0.0,
            start_bias: 0.0,
            end_bias: 0.0,
            sync_mode: SyncMode::Manual,
            headroom: DEFAULT_HEADROOM,
            rate_policy: RatePolicy::Passthrough,
        }
    }
}
