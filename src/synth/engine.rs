use std::sync::Arc;

use crate::{
    config::SynthConfig,
    dsp::RampSteps,
    pitch::Note,
    synth::{registry::SlotState, voice::Voice, VoiceRegistry},
    SILENCE_EPSILON,
};

/*
Render Engine
=============

Runs once per audio callback and fills the output block:

  1. snapshot   read every registry slot once
  2. silence    no voices → all-zero block, done
  3. render     each present voice adds `level · sin(phase)` per sample,
                stepping its envelope toward the slot's target
  4. normalise  scale by master_volume / voices_rendered, clip to [-1, 1]
  5. retire     drop released voices whose level fell below epsilon

The division by the voice count bounds the peak at master_volume no matter
how many keys are held. Everything works on fixed arrays sized by the note
set, so a block never allocates, locks or fails. A voice with an unusable
frequency is evicted and skipped; the rest of the block renders normally.
*/

pub struct RenderEngine {
    registry: Arc<VoiceRegistry>,
    voices: [Voice; Note::COUNT],
    sample_rate: f32,
    steps: RampSteps,
    master_volume: f32,
}

impl RenderEngine {
    /// Build an engine for a stream running at `sample_rate`.
    ///
    /// The rate is fixed for the engine's lifetime; a new stream gets a new
    /// engine.
    pub fn new(registry: Arc<VoiceRegistry>, sample_rate: f32, config: &SynthConfig) -> Self {
        let voices = std::array::from_fn(|i| Voice::new(registry.frequency_of(Note::ALL[i])));

        Self {
            registry,
            voices,
            sample_rate,
            steps: RampSteps::new(config.attack_seconds, config.release_seconds, sample_rate),
            master_volume: config.master_volume,
        }
    }

    /// Render one block into `block`, returning how many voices contributed.
    pub fn render_tick(&mut self, block: &mut [f32]) -> usize {
        let snapshot = self.registry.snapshot();

        block.fill(0.0);
        if !snapshot.iter().any(|s| s.is_present()) {
            return 0;
        }

        let sample_rate = f64::from(self.sample_rate);
        let mut rendered = 0usize;

        for note in Note::ALL {
            let Some(target) = snapshot[note.index()].target() else {
                continue;
            };
            let voice = &mut self.voices[note.index()];

            if !voice.is_playable() {
                self.registry.evict(note);
                voice.reset();
                continue;
            }

            voice.render_into(block, target, sample_rate, &self.steps);
            rendered += 1;
        }

        if rendered > 0 {
            let gain = self.master_volume / rendered as f32;
            for sample in block.iter_mut() {
                *sample = (*sample * gain).clamp(-1.0, 1.0);
            }
        }

        for note in Note::ALL {
            let voice = &mut self.voices[note.index()];
            if snapshot[note.index()] == SlotState::Releasing
                && voice.level() < SILENCE_EPSILON
                && self.registry.retire(note)
            {
                voice.reset();
            }
        }

        rendered
    }

    /// Envelope level of the voice for `note`, `None` when it has no voice.
    pub fn voice_level(&self, note: Note) -> Option<f32> {
        self.registry
            .is_present(note)
            .then(|| self.voices[note.index()].level())
    }

    pub fn voice(&self, note: Note) -> &Voice {
        &self.voices[note.index()]
    }

    pub fn registry(&self) -> &Arc<VoiceRegistry> {
        &self.registry
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn attack_step(&self) -> f32 {
        self.steps.attack
    }

    pub fn release_step(&self) -> f32 {
        self.steps.release
    }
}

#[cfg(test)]
mod tests {
    use std::{
        f64::consts::TAU,
        sync::atomic::{AtomicBool, Ordering},
        thread,
    };

    use super::*;
    use crate::pitch::PitchTable;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn engine_with(config: &SynthConfig, table: PitchTable) -> RenderEngine {
        let registry = Arc::new(VoiceRegistry::new(table));
        RenderEngine::new(registry, SAMPLE_RATE, config)
    }

    fn engine() -> RenderEngine {
        let config = SynthConfig::default();
        engine_with(&config, PitchTable::new(config.reference_frequency).unwrap())
    }

    fn peak(block: &[f32]) -> f32 {
        block.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    /// Render `samples` one sample at a time, returning (output, level) pairs.
    fn trace(engine: &mut RenderEngine, note: Note, samples: usize) -> Vec<(f32, f32)> {
        let mut one = [0.0f32; 1];
        (0..samples)
            .map(|_| {
                engine.render_tick(&mut one);
                (one[0], engine.voice(note).level())
            })
            .collect()
    }

    #[test]
    fn caches_ramp_steps_for_sample_rate() {
        let engine = engine();
        assert_eq!(engine.attack_step(), 1.0 / 441.0);
        assert_eq!(engine.release_step(), 1.0 / 2_205.0);
    }

    #[test]
    fn no_voices_renders_exact_silence() {
        let mut engine = engine();
        let mut block = [0.7f32; 512];
        for _ in 0..4 {
            assert_eq!(engine.render_tick(&mut block), 0);
            assert!(block.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn peak_bounded_by_master_volume() {
        for held in [1usize, 2, 13] {
            let mut engine = engine();
            for &note in &Note::ALL[..held] {
                engine.registry().press(note);
            }

            let mut block = [0.0f32; 512];
            let mut loudest = 0.0f32;
            for _ in 0..200 {
                assert_eq!(engine.render_tick(&mut block), held);
                loudest = loudest.max(peak(&block));
            }
            assert!(
                loudest <= 0.2 + 1e-6,
                "{held} voices peaked at {loudest}"
            );
            assert!(loudest > 0.0);
        }
    }

    #[test]
    fn single_voice_reaches_master_volume() {
        let mut engine = engine();
        engine.registry().press(Note::A);
        let mut block = [0.0f32; 512];
        let mut loudest = 0.0f32;
        for _ in 0..20 {
            engine.render_tick(&mut block);
            loudest = loudest.max(peak(&block));
        }
        assert!((loudest - 0.2).abs() < 1e-3);
    }

    #[test]
    fn press_then_release_traces_attack_then_release() {
        let mut engine = engine();
        let attack = engine.attack_step();
        let release = engine.release_step();

        engine.registry().press(Note::A);
        let rising = trace(&mut engine, Note::A, 600);
        engine.registry().release(Note::A);
        let falling = trace(&mut engine, Note::A, 2_300);

        let levels: Vec<f32> = rising.iter().chain(&falling).map(|&(_, l)| l).collect();
        let (up, down) = levels.split_at(rising.len());

        assert!(up.windows(2).all(|w| w[1] >= w[0]));
        assert!(down.windows(2).all(|w| w[1] <= w[0]));
        assert!(levels
            .windows(2)
            .all(|w| (w[1] - w[0]).abs() <= attack.max(release) + 1e-6));
        assert_eq!(up.last().copied(), Some(1.0));
        assert_eq!(down.last().copied(), Some(0.0));
    }

    #[test]
    fn repress_while_fading_resumes_from_current_level() {
        let mut engine = engine();
        let frequency = engine.voice(Note::A).frequency();
        let phase_step = (TAU * frequency / f64::from(SAMPLE_RATE)) as f32;
        let bound = 0.2 * (engine.attack_step() + phase_step) + 1e-5;

        engine.registry().press(Note::A);
        let mut samples = trace(&mut engine, Note::A, 500);
        engine.registry().release(Note::A);
        samples.extend(trace(&mut engine, Note::A, 300));

        let faded = samples.last().map(|&(_, l)| l).unwrap();
        assert!(faded > 0.5 && faded < 1.0);

        assert!(!engine.registry().press(Note::A), "voice should be re-armed");
        let resumed = trace(&mut engine, Note::A, 200);
        assert!(resumed[0].1 > faded, "level must ramp up from where it was");
        assert!(resumed[0].1 - faded <= engine.attack_step() + 1e-6);

        samples.extend(resumed);
        for pair in samples.windows(2) {
            let jump = (pair[1].0 - pair[0].0).abs();
            assert!(jump <= bound, "output jumped by {jump}");
        }
    }

    #[test]
    fn released_voice_removed_only_after_fading() {
        let mut engine = engine();
        engine.registry().press(Note::D);
        let mut block = [0.0f32; 512];
        engine.render_tick(&mut block);

        engine.registry().release(Note::D);
        // 2205 samples of release: still present after four blocks
        for _ in 0..4 {
            engine.render_tick(&mut block);
            assert!(engine.registry().is_present(Note::D));
        }
        engine.render_tick(&mut block);
        assert!(!engine.registry().is_present(Note::D));
        assert_eq!(engine.voice(Note::D).level(), 0.0);
        assert_eq!(engine.voice(Note::D).phase(), 0.0);

        engine.render_tick(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn held_voice_never_removed_even_at_zero_level() {
        let config = SynthConfig::default().attack_seconds(100.0);
        let mut engine = engine_with(&config, PitchTable::new(440.0).unwrap());
        engine.registry().press(Note::B);

        let mut block = [0.0f32; 1];
        engine.render_tick(&mut block);
        assert!(engine.voice(Note::B).level() < SILENCE_EPSILON);
        assert!(engine.registry().is_present(Note::B));

        let mut block = [0.0f32; 512];
        for _ in 0..50 {
            engine.render_tick(&mut block);
            assert_eq!(engine.registry().state(Note::B), SlotState::Held);
        }
    }

    #[test]
    fn unplayable_voice_is_dropped_without_stopping_others() {
        let mut frequencies = [0.0; Note::COUNT];
        for note in Note::ALL {
            frequencies[note.index()] = 440.0 + note.index() as f64 * 10.0;
        }
        frequencies[Note::E.index()] = -5.0;
        let mut engine = engine_with(&SynthConfig::default(), PitchTable::from_frequencies(frequencies));

        engine.registry().press(Note::A);
        engine.registry().press(Note::E);

        let mut block = [0.0f32; 512];
        let mut loudest = 0.0f32;
        for _ in 0..4 {
            assert_eq!(engine.render_tick(&mut block), 1);
            assert!(block.iter().all(|s| s.is_finite()));
            loudest = loudest.max(peak(&block));
        }
        assert!(loudest > 0.1, "remaining voice still renders at full gain");
        assert!(!engine.registry().is_present(Note::E));
        assert!(engine.registry().is_present(Note::A));
    }

    #[test]
    fn voice_level_absent_without_voice() {
        let mut engine = engine();
        assert_eq!(engine.voice_level(Note::F), None);
        engine.registry().press(Note::F);
        assert_eq!(engine.voice_level(Note::F), Some(0.0));
        engine.render_tick(&mut [0.0f32; 10]);
        assert!(engine.voice_level(Note::F).unwrap() > 0.0);
    }

    #[test]
    fn input_thread_races_render_thread() {
        let mut engine = engine();
        let registry = Arc::clone(engine.registry());
        let running = Arc::new(AtomicBool::new(true));

        let render = {
            let running = Arc::clone(&running);
            thread::spawn(move || {
                let mut block = [0.0f32; 64];
                let mut loudest = 0.0f32;
                while running.load(Ordering::Relaxed) {
                    engine.render_tick(&mut block);
                    loudest = loudest.max(peak(&block));
                }
                (engine, loudest)
            })
        };

        for i in 0..20_000 {
            let note = Note::ALL[i % Note::COUNT];
            registry.press(note);
            registry.release(note);
        }
        running.store(false, Ordering::Relaxed);
        let (mut engine, loudest) = render.join().unwrap();
        assert!(loudest <= 0.2 + 1e-6, "peaked at {loudest}");

        for note in Note::ALL {
            registry.press(note);
        }
        let mut block = [0.0f32; 512];
        let mut loudest = 0.0f32;
        for _ in 0..4 {
            assert_eq!(engine.render_tick(&mut block), Note::COUNT);
            loudest = loudest.max(peak(&block));
        }
        assert!(loudest <= 0.2 + 1e-6, "chord peaked at {loudest}");
        for note in Note::ALL {
            assert_eq!(registry.state(note), SlotState::Held);
            assert_eq!(engine.voice(note).level(), 1.0);
        }

        for note in Note::ALL {
            registry.release(note);
        }
        for _ in 0..6 {
            engine.render_tick(&mut block);
        }
        assert_eq!(registry.active_count(), 0);
        for note in Note::ALL {
            assert_eq!(engine.voice(note).level(), 0.0);
            assert_eq!(engine.voice(note).phase(), 0.0);
        }
    }
}
