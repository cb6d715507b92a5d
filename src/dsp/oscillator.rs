use std::f64::consts::TAU;

/*
Sine Oscillator
===============

A phase accumulator feeding `sin`. Each sample:

    out    = sin(phase)
    phase += 2π · frequency / sample_rate      (the "increment")
    phase  = phase mod 2π

Phase is kept in f64 and wrapped every sample so precision does not degrade
on long-held notes, and so a voice can be paused (not rendered) and resumed
without a discontinuity. The output is f32 like the rest of the signal path.
*/

#[derive(Debug, Clone, Copy, Default)]
pub struct SineOscillator {
    phase: f64,
}

impl SineOscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Per-sample phase advance for `frequency` at `sample_rate`.
    #[inline]
    pub fn increment(frequency: f64, sample_rate: f64) -> f64 {
        TAU * frequency / sample_rate
    }

    /// Emit the current sample and advance by `increment` radians.
    #[inline]
    pub fn next_sample(&mut self, increment: f64) -> f32 {
        let out = self.phase.sin() as f32;
        self.phase += increment;
        if self.phase >= TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }
        out
    }

    /// Current phase in radians, always within [0, 2π).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_crossing() {
        let mut osc = SineOscillator::new();
        let inc = SineOscillator::increment(440.0, 44_100.0);
        assert_eq!(osc.next_sample(inc), 0.0);
        assert!((osc.phase() - inc).abs() < 1e-12);
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut osc = SineOscillator::new();
        let inc = SineOscillator::increment(1_046.502261, 44_100.0);
        for _ in 0..100_000 {
            osc.next_sample(inc);
            assert!((0.0..TAU).contains(&osc.phase()));
        }
    }

    #[test]
    fn increments_larger_than_a_cycle_still_wrap() {
        let mut osc = SineOscillator::new();
        osc.next_sample(3.5 * TAU);
        assert!((osc.phase() - 0.5 * TAU).abs() < 1e-9);
    }

    #[test]
    fn quarter_cycle_reaches_peak() {
        // 1 kHz at 4 kHz: four samples per cycle
        let mut osc = SineOscillator::new();
        let inc = SineOscillator::increment(1_000.0, 4_000.0);
        let samples: Vec<f32> = (0..4).map(|_| osc.next_sample(inc)).collect();
        assert!((samples[1] - 1.0).abs() < 1e-6);
        assert!((samples[3] + 1.0).abs() < 1e-6);
    }
}
