use std::sync::atomic::{AtomicU8, Ordering};

use crate::pitch::{Note, PitchTable};

/*
Voice Registry
==============

The set of notes that currently have a voice, and whether each one is held.
It is written from two threads:

  input thread   press / release       (key events)
  audio thread   retire / evict        (once a voice has faded, or is broken)

The note set is closed, so the registry is one slot per note rather than a
map. A slot is a single atomic byte:

             press              release
  Vacant ──────────→ Held ─────────────→ Releasing
    ↑                 ↑                      │
    │                 └──────── press ───────┤
    └────────────── retire (silent) ─────────┘

Presence and the target level change together in one atomic step, so both
threads work in O(1) per note and neither ever waits on the other. A press
racing with retirement wins: retire is a compare-and-swap from `Releasing`,
which fails once the slot has gone back to `Held`.

Phase and envelope level are not stored here at all. They belong to the
render engine, which resets a voice when it retires it. That is what makes
"created with phase 0 and level 0" true for the next press.
*/

/// Registry view of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotState {
    /// No voice for this note
    Vacant = 0,
    /// Voice present, target level 1
    Held = 1,
    /// Voice present, target level 0, fading out
    Releasing = 2,
}

impl SlotState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SlotState::Held,
            2 => SlotState::Releasing,
            _ => SlotState::Vacant,
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, SlotState::Vacant)
    }

    /// Envelope target for a present voice.
    pub fn target(self) -> Option<f32> {
        match self {
            SlotState::Vacant => None,
            SlotState::Held => Some(1.0),
            SlotState::Releasing => Some(0.0),
        }
    }
}

/// Registry state of every note, read at the top of a render block.
pub type Snapshot = [SlotState; Note::COUNT];

pub struct VoiceRegistry {
    slots: [AtomicU8; Note::COUNT],
    pitch: PitchTable,
}

impl VoiceRegistry {
    pub fn new(pitch: PitchTable) -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU8::new(SlotState::Vacant as u8)),
            pitch,
        }
    }

    /// Start (or re-arm) the voice for `note`.
    ///
    /// Returns true if a new voice was created. A voice that is still fading
    /// keeps its phase and level and simply ramps back up.
    pub fn press(&self, note: Note) -> bool {
        let previous = self.slot(note).swap(SlotState::Held as u8, Ordering::AcqRel);
        SlotState::from_u8(previous) == SlotState::Vacant
    }

    /// Let the voice for `note` fade out. No-op when it is absent or already
    /// releasing; returns whether anything changed.
    pub fn release(&self, note: Note) -> bool {
        self.transition(note, SlotState::Held, SlotState::Releasing)
    }

    pub fn state(&self, note: Note) -> SlotState {
        SlotState::from_u8(self.slot(note).load(Ordering::Acquire))
    }

    pub fn is_present(&self, note: Note) -> bool {
        self.state(note).is_present()
    }

    /// Target level of the voice for `note`, `None` when absent.
    pub fn target(&self, note: Note) -> Option<f32> {
        self.state(note).target()
    }

    pub fn active_count(&self) -> usize {
        Note::ALL.iter().filter(|&&n| self.is_present(n)).count()
    }

    pub fn frequency_of(&self, note: Note) -> f64 {
        self.pitch.frequency_of(note)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        std::array::from_fn(|i| SlotState::from_u8(self.slots[i].load(Ordering::Acquire)))
    }

    /// Remove a voice that finished fading. Fails if it was pressed again.
    pub(crate) fn retire(&self, note: Note) -> bool {
        self.transition(note, SlotState::Releasing, SlotState::Vacant)
    }

    /// Remove a voice unconditionally.
    pub(crate) fn evict(&self, note: Note) {
        self.slot(note).store(SlotState::Vacant as u8, Ordering::Release);
    }

    fn transition(&self, note: Note, from: SlotState, to: SlotState) -> bool {
        self.slot(note)
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    fn slot(&self, note: Note) -> &AtomicU8 {
        &self.slots[note.index()]
    }
}

impl std::fmt::Debug for VoiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                Note::ALL
                    .iter()
                    .filter(|&&n| self.is_present(n))
                    .map(|&n| (n, self.state(n))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn registry() -> VoiceRegistry {
        VoiceRegistry::new(PitchTable::new(440.0).unwrap())
    }

    #[test]
    fn starts_empty() {
        let reg = registry();
        assert_eq!(reg.active_count(), 0);
        assert!(Note::ALL.iter().all(|&n| reg.state(n) == SlotState::Vacant));
    }

    #[test]
    fn press_creates_then_rearms() {
        let reg = registry();
        assert!(reg.press(Note::A));
        assert_eq!(reg.target(Note::A), Some(1.0));

        assert!(reg.release(Note::A));
        assert_eq!(reg.target(Note::A), Some(0.0));

        // Still present while fading: re-press re-arms rather than creates
        assert!(!reg.press(Note::A));
        assert_eq!(reg.state(Note::A), SlotState::Held);
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn release_of_absent_note_is_noop() {
        let reg = registry();
        assert!(!reg.release(Note::E));
        assert_eq!(reg.state(Note::E), SlotState::Vacant);
    }

    #[test]
    fn release_never_removes() {
        let reg = registry();
        reg.press(Note::G);
        reg.release(Note::G);
        assert!(!reg.release(Note::G));
        assert!(reg.is_present(Note::G));
    }

    #[test]
    fn retire_only_from_releasing() {
        let reg = registry();
        reg.press(Note::C);
        assert!(!reg.retire(Note::C), "held voices are never retired");

        reg.release(Note::C);
        reg.press(Note::C);
        assert!(!reg.retire(Note::C), "a re-press wins over retirement");

        reg.release(Note::C);
        assert!(reg.retire(Note::C));
        assert!(!reg.is_present(Note::C));
    }

    #[test]
    fn snapshot_reflects_every_slot() {
        let reg = registry();
        reg.press(Note::A);
        reg.press(Note::HighC);
        reg.release(Note::HighC);

        let snap = reg.snapshot();
        assert_eq!(snap[Note::A.index()], SlotState::Held);
        assert_eq!(snap[Note::HighC.index()], SlotState::Releasing);
        assert_eq!(snap[Note::B.index()], SlotState::Vacant);
    }

    #[test]
    fn concurrent_presses_and_releases_settle() {
        let reg = Arc::new(registry());
        let handles: Vec<_> = Note::ALL
            .iter()
            .map(|&note| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        reg.press(note);
                        reg.release(note);
                    }
                    reg.press(note);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(reg.active_count(), Note::COUNT);
    }
}
