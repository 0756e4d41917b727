//! Resolved per-channel synthesis parameters.
//!
//! A `ChannelConfig` is the boundary with the parameter-resolution layer:
//! all values arrive already validated and normalized (offsets and shape
//! parameters in [-1, 1] or [0, 1], phase in [0, 1)). The sentinel -1 marks
//! a shape parameter as unset; `resolve_defaults` fills in the type-specific
//! value.

use serde::{Deserialize, Serialize};

/// Waveform kind. Tones come first, noises after, pluck last — sweeps only
/// apply to tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveKind {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    #[serde(alias = "trapetz")]
    Trapezium,
    #[serde(rename = "exp")]
    Exponential,
    #[serde(rename = "whitenoise", alias = "noise")]
    WhiteNoise,
    #[serde(rename = "tpdfnoise")]
    TpdfNoise,
    #[serde(rename = "pinknoise")]
    PinkNoise,
    #[serde(rename = "brownnoise")]
    BrownNoise,
    Pluck,
}

impl WaveKind {
    /// Tonal kinds have a phase and can be swept; noises and pluck cannot.
    pub fn is_tone(&self) -> bool {
        matches!(
            self,
            WaveKind::Sine
                | WaveKind::Square
                | WaveKind::Sawtooth
                | WaveKind::Triangle
                | WaveKind::Trapezium
                | WaveKind::Exponential
        )
    }
}

/// Policy for blending the generated signal with the input signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Replace the input entirely.
    Create,
    /// Average generated signal and input.
    Mix,
    /// Amplitude-modulate the input by the generated signal.
    Amod,
    /// Multiply input by the generated signal.
    Fmod,
}

impl Default for CombineMode {
    fn default() -> Self {
        CombineMode::Create
    }
}

/// Frequency sweep law over the duration of synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepLaw {
    None,
    Linear,
    Square,
    #[serde(rename = "exp", alias = "exponential")]
    Exponential,
    #[serde(rename = "exp-cycle", alias = "exponential-per-cycle")]
    ExponentialPerCycle,
}

impl Default for SweepLaw {
    fn default() -> Self {
        SweepLaw::None
    }
}

/// One channel's resolved synthesis parameters, immutable once handed to
/// the engine. The engine broadcasts configs round-robin over the actual
/// I/O channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub kind: WaveKind,
    pub combine: CombineMode,
    /// Base frequency in Hz.
    pub freq: f64,
    /// End frequency in Hz; equal to `freq` when there is no sweep.
    pub freq2: f64,
    pub sweep: SweepLaw,
    /// DC offset in [-1, 1].
    pub offset: f64,
    /// Phase offset in [0, 1).
    pub phase: f64,
    /// Shape parameters; semantics depend on `kind`. -1 means unset.
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            kind: WaveKind::Sine,
            combine: CombineMode::Create,
            freq: 440.0,
            freq2: 440.0,
            sweep: SweepLaw::None,
            offset: 0.0,
            phase: 0.0,
            p1: -1.0,
            p2: -1.0,
            p3: -1.0,
        }
    }
}

impl ChannelConfig {
    /// Fill in type-specific default values for shape parameters that were
    /// left unset. Pure defaulting; no error path.
    pub fn resolve_defaults(&mut self) {
        match self.kind {
            // p1 is the pulse width (duty cycle).
            WaveKind::Square => {
                if self.p1 < 0.0 {
                    self.p1 = 0.5;
                }
            }
            // p1 is the position of the maximum.
            WaveKind::Triangle => {
                if self.p1 < 0.0 {
                    self.p1 = 0.5;
                }
            }
            // p1 ends the rising slope, p2 begins the fall, p3 ends it.
            WaveKind::Trapezium => {
                if self.p1 < 0.0 {
                    self.p1 = 0.1;
                    self.p2 = 0.5;
                    self.p3 = 0.6;
                } else if self.p2 < 0.0 {
                    if self.p1 <= 0.5 {
                        // Symmetric trapezoid around the half period.
                        self.p2 = (1.0 - 2.0 * self.p1) / 2.0;
                        self.p3 = self.p2 + self.p1;
                    } else {
                        // Symmetry impossible; asymmetric triangle instead.
                        self.p2 = self.p1;
                        self.p3 = 1.0;
                    }
                } else if self.p3 < 0.0 {
                    self.p3 = 1.0;
                }
            }
            // p1 is the peak position, p2 the amplitude floor.
            WaveKind::Exponential => {
                if self.p1 < 0.0 {
                    self.p1 = 0.5;
                }
                if self.p2 < 0.0 {
                    self.p2 = 0.5;
                }
            }
            // p1 damps the string; p2/p3 colour the two excitation passes.
            // A given p2 with unset p3 keeps p3 unset and skips the second
            // pass.
            WaveKind::Pluck => {
                if self.p1 < 0.0 {
                    self.p1 = 0.4;
                }
                if self.p2 < 0.0 {
                    self.p2 = 0.2;
                    self.p3 = 0.9;
                }
            }
            _ => {}
        }
    }
}
