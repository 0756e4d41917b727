//! Plucked-string synthesis: a filtered feedback delay loop excited by a
//! short noise burst (Karplus-Strong).
//!
//! Initialization derives three filters from the target fundamental — a
//! one-pole low-pass tuned for a fixed decibel-per-second string decay, a
//! 10 Hz DC-blocking high-pass, and an all-pass providing the fractional
//! part of the loop delay — then synthesizes and normalizes the excitation
//! buffer. The per-sample stepper applies the cascade in a fixed order:
//! the high-pass reads the stored value for output, while the low-pass and
//! all-pass together rewrite it.

use std::f64::consts::PI;

use super::random::RandomSource;
use crate::error::ConfigError;

/// String decay target in dB per second.
const DECAY_RATE: f64 = -2.0;

/// One pluck channel's filter coefficients, delay-line buffer, and filter
/// memories. The buffer length is fixed at initialization and never
/// reallocated.
#[derive(Debug, Clone)]
pub struct Pluck {
    // Low-pass pole pair, DC-block pair, all-pass coefficient.
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,

    lp_last_out: f64,
    hp_last_out: f64,
    hp_last_in: f64,
    ap_last_out: f64,
    ap_last_in: f64,

    buffer: Vec<f64>,
    pos: usize,
}

impl Pluck {
    /// Derive filter coefficients and synthesize the excitation buffer.
    ///
    /// `p1` sets string damping, `p2`/`p3` colour the two excitation
    /// passes (`p3 < 0` skips the second). A nonzero `phase` switches the
    /// excitation to the engine's shared random stream instead of a
    /// colour-seeded local one.
    pub fn new(
        freq: f64,
        sample_rate: f64,
        p1: f64,
        p2: f64,
        p3: f64,
        phase: f64,
        rng: &mut RandomSource,
    ) -> Result<Self, ConfigError> {
        if !(27.5..=4220.0).contains(&freq) {
            return Err(ConfigError::PluckFrequencyOutOfRange { freq });
        }
        // The single-pole low-pass design is very rate-dependent.
        if !(44100.0..=48000.0).contains(&sample_rate) {
            return Err(ConfigError::PluckSampleRateUnsupported { rate: sample_rate });
        }

        // Low-pass: place the pole so the loop loses DECAY_RATE dB per
        // second at the fundamental, with the cutoff tracking freq.
        let decay_f = 912f64.min(266.0 + 106.0 * freq.ln());
        let mut d = db_to_linear(DECAY_RATE / freq).powi(2);
        d = (d * (2.0 * PI * decay_f / sample_rate).cos() - 1.0) / (d - 1.0);
        let c0 = d - (d * d - 1.0).sqrt();
        let mut c1 = 1.0 - c0;

        // Extra decay from string damping.
        c1 *= (-2e4 / (0.05 + p1) / freq / sample_rate).exp();

        // High-pass (DC-block) at 10 Hz.
        let c2 = (-2.0 * PI * 10.0 / sample_rate).exp();
        let c3 = (1.0 + c2) * 0.5;

        // All-pass for the fractional part of the loop delay, net of the
        // low-pass's own delay contribution.
        let d = c0 / (c0 + c1);
        let exact_delay = sample_rate / freq - d;
        let buffer_len = exact_delay as usize;
        let frac = exact_delay - buffer_len as f64;
        let c4 = (1.0 - frac) / (1.0 + frac);

        let mut pluck = Pluck {
            c0,
            c1,
            c2,
            c3,
            c4,
            lp_last_out: 0.0,
            hp_last_out: 0.0,
            hp_last_in: 0.0,
            ap_last_out: 0.0,
            ap_last_in: 0.0,
            buffer: vec![0.0; buffer_len],
            pos: 0,
        };
        pluck.fill_excitation(p2, p3, phase != 0.0, rng);
        pluck.graduate_and_normalize();

        log::debug!(
            "pluck f={freq} c0={c0} c1={c1} df={decay_f} c2={c2} c3={c3} c4={c4} frac={frac} len={buffer_len}"
        );
        Ok(pluck)
    }

    /// Up to two passes of colored noise, each sample rejection-sampled to
    /// stay within [-1, 1]; the second pass is de-emphasized.
    fn fill_excitation(&mut self, p2: f64, p3: f64, shared_rng: bool, rng: &mut RandomSource) {
        let mut pass_p = p2;
        for pass in 0..2 {
            if pass_p < 0.0 {
                break;
            }
            let colour = 2f64.powf(4.0 * (pass_p - 1.0));
            let mut local = RandomSource::new((pass_p * 100.0 + 0.5) as i32);
            let mut carry = 0.0;
            for slot in self.buffer.iter_mut() {
                let v = loop {
                    let draw = if shared_rng {
                        rng.signed_unit()
                    } else {
                        local.signed_unit()
                    };
                    let v = carry + draw * colour;
                    if v.abs() <= 1.0 {
                        break v;
                    }
                };
                *slot += v * (1.0 - 0.3 * pass as f64);
                // colour == 1 is plain white noise; anything darker carries
                // the previous sample forward as a random walk.
                carry = if colour != 1.0 { v } else { 0.0 };
            }
            pass_p = p3;
        }
    }

    /// One pass of the loop's low-pass + all-pass over the excitation,
    /// blended in linearly across the buffer so the loop point has no
    /// audible seam, then an affine map onto exactly [-1, +1]. The filter
    /// memories seeded here carry into the runtime loop.
    fn graduate_and_normalize(&mut self) {
        let len = self.buffer.len();
        let (mut min, mut max) = (0f64, 0f64);
        for j in 0..len {
            let t = j as f64 / len as f64;
            let d = self.buffer[j] * self.c1 + self.lp_last_out * self.c0;
            self.lp_last_out = d;

            self.ap_last_out = (d - self.ap_last_out) * self.c4 + self.ap_last_in;
            self.ap_last_in = d;

            self.buffer[j] = self.buffer[j] * (1.0 - t) + self.ap_last_out * t;
            min = min.min(self.buffer[j]);
            max = max.max(self.buffer[j]);
        }

        let mut power = 0.0;
        for slot in self.buffer.iter_mut() {
            *slot = (2.0 * *slot - max - min) / (max - min);
            power += *slot * *slot;
        }
        log::debug!("pluck excitation rms={}", 10.0 * (power / len as f64).ln());
    }

    /// Advance the string by one sample. The stored value is read once:
    /// the high-pass shapes it into the output, while the low-pass and
    /// all-pass rewrite the slot for the next period.
    pub fn step(&mut self) -> f64 {
        let d = self.buffer[self.pos];

        self.hp_last_out = (d - self.hp_last_in) * self.c3 + self.hp_last_out * self.c2;
        self.hp_last_in = d;

        let out = self.hp_last_out.clamp(-1.0, 1.0);

        let d = d * self.c1 + self.lp_last_out * self.c0;
        self.lp_last_out = d;

        self.ap_last_out = (d - self.ap_last_out) * self.c4 + self.ap_last_in;
        self.buffer[self.pos] = self.ap_last_out;
        self.ap_last_in = d;

        self.pos = if self.pos + 1 == self.buffer.len() {
            0
        } else {
            self.pos + 1
        };
        out
    }
}

fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}
