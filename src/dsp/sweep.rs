//! Frequency sweep laws — phase-at-sample-index for tonal channels.
//!
//! Rate constants are derived once at channel start and never recomputed
//! mid-stream. The exponential-per-cycle law restarts phase at each cycle
//! boundary, stepping frequency once per cycle instead of continuously.

use crate::config::SweepLaw;

/// Per-channel sweep state: the law, its derived rate constant, and the
/// cycle-start accumulator used by the per-cycle law.
#[derive(Debug, Clone)]
pub struct Sweep {
    law: SweepLaw,
    freq: f64,
    rate: f64,
    cycle_start: f64,
}

impl Sweep {
    /// Derive the rate constant for `law` over `total_samples` samples.
    /// `total_samples == 0` (unbounded) yields a zero rate; callers reject
    /// that combination for real sweeps before construction.
    pub fn new(
        law: SweepLaw,
        freq: f64,
        freq2: f64,
        total_samples: u64,
        sample_rate: f64,
    ) -> Self {
        let n = total_samples as f64;
        let mut base = freq;
        let rate = match law {
            SweepLaw::None => 0.0,
            SweepLaw::Linear => {
                if total_samples > 0 {
                    (freq2 - freq) / n / 2.0
                } else {
                    0.0
                }
            }
            SweepLaw::Square => {
                if total_samples > 0 {
                    let m = (freq2 - freq).abs().sqrt() / n / 3f64.sqrt();
                    if freq > freq2 { -m } else { m }
                } else {
                    0.0
                }
            }
            SweepLaw::Exponential => {
                // Equal endpoints degenerate to a constant frequency.
                if total_samples > 0 && freq2 != freq {
                    let m = (freq2 / freq).ln() / n * sample_rate;
                    base = freq / m;
                    m
                } else {
                    0.0
                }
            }
            SweepLaw::ExponentialPerCycle => {
                if total_samples > 0 {
                    (freq2.ln() - freq.ln()) / n
                } else {
                    0.0
                }
            }
        };
        Sweep {
            law,
            freq: base,
            rate,
            cycle_start: 0.0,
        }
    }

    /// Instantaneous phase (before the channel's phase offset is added) at
    /// sample index `samples_done`, `elapsed` seconds into the stream.
    pub fn phase(&mut self, samples_done: u64, elapsed: f64) -> f64 {
        let k = samples_done as f64;
        match self.law {
            SweepLaw::None => self.freq * elapsed,
            SweepLaw::Linear => (self.freq + k * self.rate) * elapsed,
            SweepLaw::Square => {
                let d = k * self.rate;
                let sign = if self.rate < 0.0 { -1.0 } else { 1.0 };
                (self.freq + sign * d * d) * elapsed
            }
            SweepLaw::Exponential => {
                if self.rate == 0.0 {
                    self.freq * elapsed
                } else {
                    self.freq * (self.rate * elapsed).exp()
                }
            }
            SweepLaw::ExponentialPerCycle => {
                let f = self.freq * (k * self.rate).exp();
                let mut cycle_elapsed = elapsed - self.cycle_start;
                if f * cycle_elapsed >= 1.0 {
                    // Next cycle: restart from a boundary estimated with the
                    // current frequency.
                    self.cycle_start += 1.0 / f;
                    cycle_elapsed = elapsed - self.cycle_start;
                }
                f * cycle_elapsed
            }
        }
    }
}
