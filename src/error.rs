use std::fmt;

use crate::config::WaveKind;

/// Configuration failures, detected once when the engine starts (or when a
/// JSON spec is parsed) and surfaced before any sample is produced. There
/// are no per-sample error conditions.
#[derive(Debug)]
pub enum ConfigError {
    /// A frequency sweep was requested for a type that has no pitch.
    SweepOnNoiseType { kind: WaveKind },
    /// A second frequency was given but the run is unbounded, so no sweep
    /// rate can be derived.
    SweepRequiresDuration,
    /// An exponential sweep with a zero endpoint frequency.
    ExpSweepZeroFrequency,
    /// Pluck fundamental outside the playable range of the string model.
    PluckFrequencyOutOfRange { freq: f64 },
    /// The pluck filter design is rate-sensitive and only valid near CD/DAT
    /// rates.
    PluckSampleRateUnsupported { rate: f64 },
    /// Malformed channel-spec JSON handed to the boundary layer.
    Spec { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SweepOnNoiseType { kind } => {
                write!(f, "can't sweep type {kind:?}")
            }
            ConfigError::SweepRequiresDuration => {
                write!(f, "duration must be given when sweeping to a second frequency")
            }
            ConfigError::ExpSweepZeroFrequency => {
                write!(f, "invalid frequency for exponential sweep")
            }
            ConfigError::PluckFrequencyOutOfRange { freq } => {
                write!(f, "pluck frequency {freq}Hz outside 27.5-4220Hz")
            }
            ConfigError::PluckSampleRateUnsupported { rate } => {
                write!(f, "sample rate for pluck must be 44100-48000, got {rate}")
            }
            ConfigError::Spec { message } => write!(f, "invalid channel spec: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Spec {
            message: e.to_string(),
        }
    }
}
