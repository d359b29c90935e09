use serde::{Deserialize, Serialize};

/// An effect attached to a clip.
///
/// Descriptors are carried through editing and persistence untouched; the
/// mixer does not process them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Gain(GainParams),
    Equalizer(EqualizerParams),
    Compressor(CompressorParams),
    NoiseGate(NoiseGateParams),
    Reverb(ReverbParams),
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Gain(_) => "gain",
            Effect::Equalizer(_) => "equalizer",
            Effect::Compressor(_) => "compressor",
            Effect::NoiseGate(_) => "noise_gate",
            Effect::Reverb(_) => "reverb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainParams {
    pub db: f32,
}

/// Three-band shelf/peak equalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerParams {
    pub low_db: f32,
    pub mid_db: f32,
    pub high_db: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorParams {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 3.0,
            attack_ms: 10.0,
            release_ms: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseGateParams {
    pub threshold_db: f32,
    pub release_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbParams {
    /// 0.0 (small room) to 1.0 (hall)
    pub room_size: f32,
    /// Wet/dry mix, 0.0 to 1.0
    pub wet: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_json_is_tagged() {
        let effect = Effect::NoiseGate(NoiseGateParams {
            threshold_db: -50.0,
            release_ms: 80.0,
        });

        let json = serde_json::to_string(&effect).expect("serialize");
        assert!(json.contains("\"kind\":\"noise_gate\""));

        let decoded: Effect = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, effect);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<Effect, _> = serde_json::from_str(r#"{"kind":"flanger","rate":2.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(Effect::Compressor(CompressorParams::default()).name(), "compressor");
        assert_eq!(Effect::Reverb(ReverbParams { room_size: 0.3, wet: 0.2 }).name(), "reverb");
    }
}
