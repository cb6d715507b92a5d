/*
Gate Envelope
=============

Each voice's amplitude chases a target level that is either 1.0 (key held)
or 0.0 (key released). The level moves toward the target by a fixed step per
sample and clamps at the end:

  Level
    1.0 ┐    ╱‾‾‾‾‾‾‾‾‾‾‾╲
        │   ╱             ╲
        │  ╱               ╲
    0.0 └─╱─────────────────╲───→ Time
         attack   held    release

There is no decay/sustain stage and no reset on retrigger. If the key is
pressed again while the level is still falling, the ramp turns around from
wherever it is. The output never jumps by more than one step between
consecutive samples, which is what keeps re-presses click-free.


Steps
-----

    step = 1 / max(1, floor(seconds * sample_rate))

A zero or sub-sample duration degenerates to a one-sample ramp. Steps depend
only on the sample rate and the configured durations, so they are computed
once and shared by every voice.
*/

/// Per-sample level change for the attack and release ramps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampSteps {
    pub attack: f32,
    pub release: f32,
}

impl RampSteps {
    pub fn new(attack_seconds: f32, release_seconds: f32, sample_rate: f32) -> Self {
        Self {
            attack: ramp_step(attack_seconds, sample_rate),
            release: ramp_step(release_seconds, sample_rate),
        }
    }
}

fn ramp_step(seconds: f32, sample_rate: f32) -> f32 {
    1.0 / (seconds * sample_rate).floor().max(1.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GateEnvelope {
    level: f32,
}

impl GateEnvelope {
    pub fn new() -> Self {
        Self { level: 0.0 }
    }

    /// Move one step toward `target` and return the new level.
    #[inline]
    pub fn next_sample(&mut self, target: f32, steps: &RampSteps) -> f32 {
        if target > self.level {
            self.level = (self.level + steps.attack).min(target);
        } else if target < self.level {
            self.level = (self.level - steps.release).max(target);
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
