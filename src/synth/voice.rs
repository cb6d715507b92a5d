use crate::dsp::{GateEnvelope, RampSteps, SineOscillator};

/// Render-side state of one note: fixed pitch, oscillator phase and envelope
/// level.
///
/// Only the render engine holds these, so phase and level are never written
/// from the input thread. A fresh or reset voice sits at phase 0 and level 0.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    frequency: f64,
    osc: SineOscillator,
    env: GateEnvelope,
}

impl Voice {
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            osc: SineOscillator::new(),
            env: GateEnvelope::new(),
        }
    }

    /// Whether the frequency is something an oscillator can play.
    pub fn is_playable(&self) -> bool {
        self.frequency.is_finite() && self.frequency > 0.0
    }

    /// Add this voice's next `out.len()` samples into `out`.
    ///
    /// The envelope steps toward `target` before each sample, so the first
    /// sample after a press is already one attack step above silence.
    pub fn render_into(&mut self, out: &mut [f32], target: f32, sample_rate: f64, steps: &RampSteps) {
        let increment = SineOscillator::increment(self.frequency, sample_rate);
        for sample in out.iter_mut() {
            let level = self.env.next_sample(target, steps);
            *sample += level * self.osc.next_sample(increment);
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn phase(&self) -> f64 {
        self.osc.phase()
    }

    pub fn reset(&mut self) {
        self.osc.reset();
        self.env.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 44_100.0;

    #[test]
    fn fresh_voice_is_silent_at_phase_zero() {
        let voice = Voice::new(440.0);
        assert_eq!(voice.level(), 0.0);
        assert_eq!(voice.phase(), 0.0);
    }

    #[test]
    fn render_accumulates_into_existing_samples() {
        let steps = RampSteps::new(0.0, 0.0, SAMPLE_RATE as f32);
        let mut voice = Voice::new(440.0);
        let mut out = [0.5f32; 8];
        voice.render_into(&mut out, 1.0, SAMPLE_RATE, &steps);

        // First sample is sin(0) = 0 on top of the existing 0.5
        assert_eq!(out[0], 0.5);
        assert!(out[1] > 0.5);
    }

    #[test]
    fn rejects_unplayable_frequencies() {
        assert!(Voice::new(440.0).is_playable());
        assert!(!Voice::new(0.0).is_playable());
        assert!(!Voice::new(-1.0).is_playable());
        assert!(!Voice::new(f64::NAN).is_playable());
        assert!(!Voice::new(f64::INFINITY).is_playable());
    }

    #[test]
    fn reset_returns_to_creation_state() {
        let steps = RampSteps::new(0.01, 0.05, SAMPLE_RATE as f32);
        let mut voice = Voice::new(440.0);
        let mut out = [0.0f32; 64];
        voice.render_into(&mut out, 1.0, SAMPLE_RATE, &steps);
        assert!(voice.level() > 0.0);
        assert!(voice.phase() > 0.0);

        voice.reset();
        assert_eq!(voice.level(), 0.0);
        assert_eq!(voice.phase(), 0.0);
        assert_eq!(voice.frequency(), 440.0);
    }
}
