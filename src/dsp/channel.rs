//! Channel — one I/O channel's synthesis state and per-sample transform.
//!
//! A channel turns a resolved config into a tagged source (tone, noise, or
//! pluck), then on each sample generates a value in [-1, 1], applies the DC
//! offset without clipping, and combines with the incoming sample.

use super::oscillator::Shape;
use super::pink::PinkNoise;
use super::pluck::Pluck;
use super::random::RandomSource;
use super::sweep::Sweep;
use crate::config::{ChannelConfig, CombineMode, SweepLaw, WaveKind};
use crate::error::ConfigError;

/// Full scale of the native sample domain the host trades in.
pub const SAMPLE_MAX: f64 = i32::MAX as f64;

/// Base row count for pink noise; each channel adds two rows per index so
/// multi-channel pink output decorrelates.
const PINK_BASE_ROWS: usize = 10;

/// What a channel generates each sample. Each variant carries only its own
/// state.
#[derive(Debug, Clone)]
enum Source {
    Tone { shape: Shape, sweep: Sweep },
    White,
    Tpdf,
    Pink(PinkNoise),
    Brown { last: f64 },
    Pluck(Box<Pluck>),
}

/// One channel's synthesis state. Created at engine start from the config
/// selected for this channel index; destroyed at stop.
#[derive(Debug, Clone)]
pub struct Channel {
    source: Source,
    combine: CombineMode,
    offset: f64,
    phase_offset: f64,
    sample_rate: f64,
}

impl Channel {
    /// Build a channel from an already-defaulted config, validating the
    /// parameter combinations that only the core can judge.
    pub fn new(
        config: &ChannelConfig,
        channel_index: usize,
        total_samples: u64,
        sample_rate: f64,
        rng: &mut RandomSource,
    ) -> Result<Self, ConfigError> {
        if config.sweep != SweepLaw::None {
            if !config.kind.is_tone() {
                return Err(ConfigError::SweepOnNoiseType { kind: config.kind });
            }
            if total_samples == 0 {
                return Err(ConfigError::SweepRequiresDuration);
            }
            if matches!(
                config.sweep,
                SweepLaw::Exponential | SweepLaw::ExponentialPerCycle
            ) && config.freq * config.freq2 == 0.0
            {
                return Err(ConfigError::ExpSweepZeroFrequency);
            }
        }

        let source = match config.kind {
            WaveKind::Sine => Self::tone(Shape::Sine, config, total_samples, sample_rate),
            WaveKind::Square => Self::tone(
                Shape::Square { duty: config.p1 },
                config,
                total_samples,
                sample_rate,
            ),
            WaveKind::Sawtooth => Self::tone(Shape::Sawtooth, config, total_samples, sample_rate),
            WaveKind::Triangle => Self::tone(
                Shape::Triangle { peak: config.p1 },
                config,
                total_samples,
                sample_rate,
            ),
            WaveKind::Trapezium => Self::tone(
                Shape::Trapezium {
                    rise_end: config.p1,
                    fall_start: config.p2,
                    fall_end: config.p3,
                },
                config,
                total_samples,
                sample_rate,
            ),
            WaveKind::Exponential => Self::tone(
                Shape::Exponential {
                    peak: config.p1,
                    floor: Shape::exp_floor(config.p2),
                },
                config,
                total_samples,
                sample_rate,
            ),
            WaveKind::WhiteNoise => Source::White,
            WaveKind::TpdfNoise => Source::Tpdf,
            WaveKind::PinkNoise => {
                Source::Pink(PinkNoise::new(PINK_BASE_ROWS + 2 * channel_index))
            }
            WaveKind::BrownNoise => Source::Brown { last: 0.0 },
            WaveKind::Pluck => Source::Pluck(Box::new(Pluck::new(
                config.freq,
                sample_rate,
                config.p1,
                config.p2,
                config.p3,
                config.phase,
                rng,
            )?)),
        };

        Ok(Channel {
            source,
            combine: config.combine,
            offset: config.offset,
            phase_offset: config.phase,
            sample_rate,
        })
    }

    fn tone(shape: Shape, config: &ChannelConfig, total_samples: u64, sample_rate: f64) -> Source {
        Source::Tone {
            shape,
            sweep: Sweep::new(
                config.sweep,
                config.freq,
                config.freq2,
                total_samples,
                sample_rate,
            ),
        }
    }

    /// Produce one output sample in the native sample domain, given the
    /// incoming sample and the global frame index.
    pub fn produce(&mut self, input: f64, samples_done: u64, rng: &mut RandomSource) -> f64 {
        let generated = match &mut self.source {
            Source::Tone { shape, sweep } => {
                let elapsed = samples_done as f64 / self.sample_rate;
                let phase = (sweep.phase(samples_done, elapsed) + self.phase_offset) % 1.0;
                shape.sample(phase)
            }
            Source::White => rng.signed_unit(),
            Source::Tpdf => 0.5 * (rng.signed_unit() + rng.signed_unit()),
            Source::Pink(pink) => pink.generate(rng),
            Source::Brown { last } => {
                // Bounded random walk; rejection keeps it in [-1, 1] with
                // no hard clipping.
                let next = loop {
                    let step = *last + rng.signed_unit() * (1.0 / 16.0);
                    if step.abs() <= 1.0 {
                        break step;
                    }
                };
                *last = next;
                next
            }
            Source::Pluck(pluck) => pluck.step(),
        };

        // Add the DC offset, scaled so the sum cannot leave [-1, 1].
        let s = generated * (1.0 - self.offset.abs()) + self.offset;

        match self.combine {
            CombineMode::Create => s * SAMPLE_MAX,
            CombineMode::Mix => (s * SAMPLE_MAX + input) * 0.5,
            CombineMode::Amod => (s + 1.0) * input * 0.5,
            CombineMode::Fmod => s * input,
        }
    }
}
