//! Periodic waveform shapes.
//!
//! Each shape is a pure function of a phase already folded into [0, 1);
//! output is in [-1, 1]. Every variant carries only the parameters its
//! geometry needs.

use std::f64::consts::PI;

/// A periodic waveform shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sine,
    /// `duty` is the fraction of the period spent at +1.
    Square { duty: f64 },
    Sawtooth,
    /// `peak` is the phase position of the +1 maximum.
    Triangle { peak: f64 },
    /// Rise to +1 over [0, rise_end], hold, fall to -1 over
    /// [fall_start, fall_end], hold.
    Trapezium {
        rise_end: f64,
        fall_start: f64,
        fall_end: f64,
    },
    /// Two-sided exponential pulse peaking at `peak`, with `floor` the
    /// linear amplitude floor the pulse decays to.
    Exponential { peak: f64, floor: f64 },
}

impl Shape {
    /// Linear amplitude floor for the exponential pulse: `p2` in [0, 1]
    /// selects the floor depth on a dB scale (`p2 = 1` is -200 dB).
    pub fn exp_floor(p2: f64) -> f64 {
        10f64.powf(p2 * -200.0 / 20.0)
    }

    /// Evaluate the shape at `phase` in [0, 1).
    pub fn sample(&self, phase: f64) -> f64 {
        match *self {
            Shape::Sine => (2.0 * PI * phase).sin(),

            Shape::Square { duty } => {
                if phase < duty { 1.0 } else { -1.0 }
            }

            Shape::Sawtooth => -1.0 + 2.0 * phase,

            Shape::Triangle { peak } => {
                if phase < peak {
                    -1.0 + 2.0 * phase / peak
                } else {
                    1.0 - 2.0 * (phase - peak) / (1.0 - peak)
                }
            }

            Shape::Trapezium {
                rise_end,
                fall_start,
                fall_end,
            } => {
                if phase < rise_end {
                    -1.0 + 2.0 * phase / rise_end
                } else if phase < fall_start {
                    1.0
                } else if phase < fall_end {
                    1.0 - 2.0 * (phase - fall_start) / (fall_end - fall_start)
                } else {
                    -1.0
                }
            }

            Shape::Exponential { peak, floor } => {
                // Pulse in [floor, 1], then mapped onto [-1, 1].
                let v = if phase < peak {
                    floor * (phase * (1.0 / floor).ln() / peak).exp()
                } else {
                    floor * ((1.0 - phase) * (1.0 / floor).ln() / (1.0 - peak)).exp()
                };
                v * 2.0 - 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_boundary() {
        assert!(Shape::Sine.sample(0.0).abs() < 1e-12);
        assert!((Shape::Sine.sample(0.25) - 1.0).abs() < 1e-12);
        assert!((Shape::Sine.sample(0.75) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn square_boundary_and_duty() {
        let sq = Shape::Square { duty: 0.5 };
        assert_eq!(sq.sample(0.0), 1.0);
        assert_eq!(sq.sample(0.49), 1.0);
        assert_eq!(sq.sample(0.5), -1.0);

        let narrow = Shape::Square { duty: 0.0 };
        assert_eq!(narrow.sample(0.0), -1.0, "zero duty never reaches +1");
    }

    #[test]
    fn sawtooth_is_monotonic_ramp() {
        assert_eq!(Shape::Sawtooth.sample(0.0), -1.0);
        assert!((Shape::Sawtooth.sample(0.5) - 0.0).abs() < 1e-12);
        let mut prev = -2.0;
        for i in 0..100 {
            let v = Shape::Sawtooth.sample(i as f64 / 100.0);
            assert!(v > prev, "ramp must rise");
            prev = v;
        }
    }

    #[test]
    fn triangle_hits_peak_at_p1() {
        let tri = Shape::Triangle { peak: 0.25 };
        assert_eq!(tri.sample(0.0), -1.0);
        assert!((tri.sample(0.25) - 1.0).abs() < 1e-12);
        // Falling edge midpoint.
        assert!((tri.sample(0.625) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn trapezium_segments() {
        let trap = Shape::Trapezium {
            rise_end: 0.1,
            fall_start: 0.5,
            fall_end: 0.6,
        };
        assert_eq!(trap.sample(0.0), -1.0);
        assert!((trap.sample(0.05) - 0.0).abs() < 1e-12, "mid-rise crosses 0");
        assert_eq!(trap.sample(0.3), 1.0, "plateau holds +1");
        assert!((trap.sample(0.55) - 0.0).abs() < 1e-12, "mid-fall crosses 0");
        assert_eq!(trap.sample(0.8), -1.0, "low part holds -1");
    }

    #[test]
    fn exponential_boundary_is_mapped_floor() {
        let floor = Shape::exp_floor(0.5);
        let shape = Shape::Exponential { peak: 0.5, floor };
        let expected = floor * 2.0 - 1.0;
        assert!((shape.sample(0.0) - expected).abs() < 1e-12);
        // Peak reaches +1.
        assert!((shape.sample(0.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exp_floor_is_db_linear() {
        // p2 = 0.5 -> -100 dB -> 1e-5.
        assert!((Shape::exp_floor(0.5) - 1e-5).abs() < 1e-17);
        assert_eq!(Shape::exp_floor(0.0), 1.0);
    }

    #[test]
    fn all_shapes_bounded() {
        let shapes = [
            Shape::Sine,
            Shape::Square { duty: 0.3 },
            Shape::Sawtooth,
            Shape::Triangle { peak: 0.5 },
            Shape::Trapezium {
                rise_end: 0.1,
                fall_start: 0.5,
                fall_end: 0.6,
            },
            Shape::Exponential {
                peak: 0.5,
                floor: Shape::exp_floor(0.5),
            },
        ];
        for shape in &shapes {
            for i in 0..1000 {
                let v = shape.sample(i as f64 / 1000.0);
                assert!(
                    (-1.0..=1.0).contains(&v),
                    "{shape:?} out of range at {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn folded_phase_is_periodic() {
        // Folding any integer number of periods onto the phase yields the
        // identical sample.
        let shapes = [
            Shape::Sine,
            Shape::Square { duty: 0.5 },
            Shape::Sawtooth,
            Shape::Triangle { peak: 0.5 },
        ];
        for shape in &shapes {
            for i in 0..97 {
                let phase = i as f64 / 97.0;
                for k in 1..4 {
                    let folded = (phase + k as f64) % 1.0;
                    assert!(
                        (shape.sample(phase) - shape.sample(folded)).abs() < 1e-9,
                        "{shape:?} not periodic at {phase}"
                    );
                }
            }
        }
    }
}
