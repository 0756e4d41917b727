//! Synthesis engine — owns per-channel state and drives blocks of frames.
//!
//! The engine is configured once with a list of channel configs and a total
//! sample count (0 = unbounded), then `start` builds one channel per actual
//! I/O channel, broadcasting configs round-robin by index. All state
//! advances strictly one sample frame at a time; channels never read each
//! other, only the shared frame counter and random stream.

use super::channel::Channel;
use super::random::RandomSource;
use crate::config::ChannelConfig;
use crate::error::ConfigError;

/// The synthesis engine. One instance per effect invocation.
#[derive(Debug, Clone)]
pub struct SynthEngine {
    configs: Vec<ChannelConfig>,
    samples_to_do: u64,
    samples_done: u64,
    channels: Vec<Channel>,
    sample_rate: f64,
    rng: RandomSource,
    seed: i32,
    no_headroom: bool,
    gain: f64,
    complete: bool,
}

impl SynthEngine {
    /// Configure an engine. An empty config list behaves as one default
    /// channel (440 Hz sine, create). `samples_to_do == 0` runs unbounded.
    pub fn new(mut configs: Vec<ChannelConfig>, samples_to_do: u64) -> Self {
        if configs.is_empty() {
            configs.push(ChannelConfig::default());
        }
        SynthEngine {
            configs,
            samples_to_do,
            samples_done: 0,
            channels: Vec::new(),
            sample_rate: 0.0,
            rng: RandomSource::default(),
            seed: 0,
            no_headroom: false,
            gain: 1.0,
            complete: false,
        }
    }

    /// Seed the engine's random stream for reproducible noise and pluck
    /// excitation.
    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    /// Ask the host to apply unity gain rather than reserving headroom.
    pub fn disable_headroom(&mut self) {
        self.no_headroom = true;
    }

    /// Validate the configuration against the stream parameters and build
    /// per-channel state. Must be called before producing samples; all
    /// configuration errors surface here, never at sample time.
    pub fn start(&mut self, channel_count: usize, sample_rate: f64) -> Result<(), ConfigError> {
        self.samples_done = 0;
        self.complete = false;
        self.gain = 1.0;
        self.sample_rate = sample_rate;
        self.rng = RandomSource::new(self.seed);

        self.channels = Vec::with_capacity(channel_count);
        for i in 0..channel_count {
            let mut config = self.configs[i % self.configs.len()].clone();
            config.resolve_defaults();
            log::debug!(
                "channel {i}: kind={:?} combine={:?} f1={} f2={} sweep={:?} offset={} phase={} p1={} p2={} p3={}",
                config.kind,
                config.combine,
                config.freq,
                config.freq2,
                config.sweep,
                config.offset,
                config.phase,
                config.p1,
                config.p2,
                config.p3,
            );
            let channel = Channel::new(
                &config,
                i,
                self.samples_to_do,
                sample_rate,
                &mut self.rng,
            )?;
            self.channels.push(channel);
        }
        Ok(())
    }

    /// Produce one channel's output sample for the current frame. Call once
    /// per channel, then `advance_frame`. Must only be called after a
    /// successful `start`.
    pub fn produce_sample(&mut self, channel_index: usize, input: f64) -> f64 {
        let samples_done = self.samples_done;
        let out = self.channels[channel_index].produce(input, samples_done, &mut self.rng);
        // Round toward nearest ahead of the host's integer quantization.
        if out < 0.0 {
            out * self.gain - 0.5
        } else {
            out * self.gain + 0.5
        }
    }

    /// Advance the global frame counter. A bounded run completes exactly
    /// when the counter reaches the configured total.
    pub fn advance_frame(&mut self) {
        self.samples_done += 1;
        if self.samples_done == self.samples_to_do {
            self.complete = true;
        }
    }

    /// Drive all channels across a block of interleaved frames. Consumes
    /// and produces `min(input.len(), output.len())` samples, rounded down
    /// to whole frames; stops early at completion. Returns the number of
    /// samples written.
    pub fn process_block(&mut self, input: &[f64], output: &mut [f64]) -> usize {
        let channels = self.channels.len();
        if channels == 0 {
            return 0;
        }
        let frames = input.len().min(output.len()) / channels;
        let mut done = 0;
        while done < frames && !self.complete {
            let base = done * channels;
            for c in 0..channels {
                output[base + c] = self.produce_sample(c, input[base + c]);
            }
            self.advance_frame();
            done += 1;
        }
        done * channels
    }

    /// Has a bounded run produced its final frame? Unbounded runs never
    /// complete on their own.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Release per-channel state (including any pluck delay line).
    pub fn stop(&mut self) {
        self.channels.clear();
    }

    /// The output gain the host should apply, or `None` when headroom was
    /// disabled and unity gain is implied.
    pub fn suggested_gain(&self) -> Option<f64> {
        if self.no_headroom { None } else { Some(self.gain) }
    }

    /// Host-adjustable headroom gain applied to every output sample.
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    /// Number of I/O channels built at start.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CombineMode, SweepLaw, WaveKind};
    use crate::dsp::channel::SAMPLE_MAX;

    fn start_engine(configs: Vec<ChannelConfig>, total: u64, channels: usize) -> SynthEngine {
        let mut engine = SynthEngine::new(configs, total);
        engine.start(channels, 44100.0).expect("start failed");
        engine
    }

    #[test]
    fn sine_quarter_points() {
        let cfg = ChannelConfig {
            freq: 1.0,
            freq2: 1.0,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 4);
        engine.start(1, 4.0).unwrap();

        let mut out = [0.0; 4];
        let input = [0.0; 4];
        engine.process_block(&input, &mut out);

        let expected = [0.0, 1.0, 0.0, -1.0];
        for (i, (&got, &want)) in out.iter().zip(expected.iter()).enumerate() {
            assert!(
                (got / SAMPLE_MAX - want).abs() < 1e-6,
                "sample {i}: expected {want}, got {}",
                got / SAMPLE_MAX
            );
        }
    }

    #[test]
    fn square_half_duty_pattern() {
        let cfg = ChannelConfig {
            kind: WaveKind::Square,
            freq: 1.0,
            freq2: 1.0,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 4);
        engine.start(1, 4.0).unwrap();

        let mut out = [0.0; 4];
        engine.process_block(&[0.0; 4], &mut out);

        let expected = [1.0, 1.0, -1.0, -1.0];
        for (i, (&got, &want)) in out.iter().zip(expected.iter()).enumerate() {
            assert!(
                (got / SAMPLE_MAX - want).abs() < 1e-6,
                "sample {i}: expected {want}, got {}",
                got / SAMPLE_MAX
            );
        }
    }

    #[test]
    fn bounded_run_completes_exactly() {
        let mut engine = start_engine(vec![ChannelConfig::default()], 10, 2);
        let input = [0.0; 32];
        let mut output = [0.0; 32];

        let written = engine.process_block(&input, &mut output);
        assert_eq!(written, 20, "10 frames of 2 channels");
        assert!(engine.is_complete());

        // Further blocks produce nothing.
        let written = engine.process_block(&input, &mut output);
        assert_eq!(written, 0);
    }

    #[test]
    fn completion_not_early() {
        let mut engine = start_engine(vec![ChannelConfig::default()], 10, 1);
        for _ in 0..9 {
            engine.produce_sample(0, 0.0);
            engine.advance_frame();
            assert!(!engine.is_complete(), "must not complete before frame 10");
        }
        engine.produce_sample(0, 0.0);
        engine.advance_frame();
        assert!(engine.is_complete());
    }

    #[test]
    fn unbounded_run_never_completes() {
        let mut engine = start_engine(vec![ChannelConfig::default()], 0, 1);
        let input = [0.0; 256];
        let mut output = [0.0; 256];
        for _ in 0..100 {
            assert_eq!(engine.process_block(&input, &mut output), 256);
        }
        assert!(!engine.is_complete());
    }

    #[test]
    fn configs_broadcast_round_robin() {
        // Two configs over four channels: noise channels land on 1 and 3.
        let sine = ChannelConfig {
            freq: 100.0,
            freq2: 100.0,
            ..Default::default()
        };
        let noise = ChannelConfig {
            kind: WaveKind::WhiteNoise,
            ..Default::default()
        };
        let mut engine = start_engine(vec![sine, noise], 0, 4);
        assert_eq!(engine.channel_count(), 4);
        let input = [0.0; 8];
        let mut output = [0.0; 8];
        engine.process_block(&input, &mut output);

        // Frame 0: sine channels at phase 0 emit (rounded) zero; noise
        // channels are almost surely nonzero.
        assert!(output[0].abs() <= 0.5);
        assert!(output[2].abs() <= 0.5);
        assert!(output[1].abs() > 1.0);
        assert!(output[3].abs() > 1.0);
    }

    #[test]
    fn gain_scales_output() {
        let cfg = ChannelConfig {
            kind: WaveKind::Square,
            freq: 1.0,
            freq2: 1.0,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 0);
        engine.start(1, 4.0).unwrap();
        engine.set_gain(0.5);
        let out = engine.produce_sample(0, 0.0);
        assert!(
            (out - (SAMPLE_MAX * 0.5 + 0.5)).abs() < 1e-6,
            "gain applied before rounding bias, got {out}"
        );
    }

    #[test]
    fn headroom_gain_reporting() {
        let mut engine = start_engine(vec![ChannelConfig::default()], 0, 1);
        assert_eq!(engine.suggested_gain(), Some(1.0));
        engine.disable_headroom();
        assert_eq!(engine.suggested_gain(), None);
    }

    #[test]
    fn start_rejects_bad_pluck_rate() {
        let cfg = ChannelConfig {
            kind: WaveKind::Pluck,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 0);
        let err = engine.start(1, 22050.0);
        assert!(matches!(
            err,
            Err(ConfigError::PluckSampleRateUnsupported { .. })
        ));
    }

    #[test]
    fn mix_blends_generated_and_input() {
        let cfg = ChannelConfig {
            kind: WaveKind::Square,
            combine: CombineMode::Mix,
            freq: 1.0,
            freq2: 1.0,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 0);
        engine.start(1, 4.0).unwrap();
        // Square at +1 mixed with silence halves the full-scale value.
        let out = engine.produce_sample(0, 0.0);
        assert!(
            (out - (SAMPLE_MAX * 0.5 + 0.5)).abs() < 1e-6,
            "got {out}"
        );
    }

    #[test]
    fn swept_engine_produces_finite_samples() {
        let cfg = ChannelConfig {
            sweep: SweepLaw::Exponential,
            freq: 100.0,
            freq2: 1000.0,
            ..Default::default()
        };
        let mut engine = SynthEngine::new(vec![cfg], 4410);
        engine.start(1, 44100.0).unwrap();
        let input = vec![0.0; 4410];
        let mut output = vec![0.0; 4410];
        let written = engine.process_block(&input, &mut output);
        assert_eq!(written, 4410);
        assert!(output.iter().all(|s| s.is_finite()));
        assert!(output.iter().all(|s| s.abs() <= SAMPLE_MAX + 0.5));
    }

    #[test]
    fn empty_config_list_uses_default_channel() {
        let mut engine = SynthEngine::new(Vec::new(), 4);
        engine.start(1, 4.0).unwrap();
        let mut out = [0.0; 4];
        engine.process_block(&[0.0; 4], &mut out);
        // Default channel is a 440 Hz sine; at a 4 Hz rate it folds to 0
        // phase every sample (440 cycles per second is an integer multiple).
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(engine.is_complete());
    }

    #[test]
    fn equal_seeds_reproduce_noise_output() {
        let cfg = ChannelConfig {
            kind: WaveKind::WhiteNoise,
            ..Default::default()
        };
        let mut a = SynthEngine::new(vec![cfg.clone()], 0).with_seed(77);
        let mut b = SynthEngine::new(vec![cfg], 0).with_seed(77);
        a.start(1, 44100.0).unwrap();
        b.start(1, 44100.0).unwrap();
        for _ in 0..1000 {
            assert_eq!(a.produce_sample(0, 0.0), b.produce_sample(0, 0.0));
            a.advance_frame();
            b.advance_frame();
        }
    }

    #[test]
    fn restart_resets_frame_counter() {
        let mut engine = start_engine(vec![ChannelConfig::default()], 5, 1);
        let input = [0.0; 8];
        let mut output = [0.0; 8];
        engine.process_block(&input, &mut output);
        assert!(engine.is_complete());

        engine.start(1, 44100.0).unwrap();
        assert!(!engine.is_complete());
        assert_eq!(engine.process_block(&input, &mut output), 5);
    }
}
