use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::trace;

use super::KeyMap;
use crate::{pitch::Note, synth::VoiceRegistry};

/// Receiver of note edges coming out of the bridge.
pub trait NoteSink {
    fn note_on(&mut self, note: Note);
    fn note_off(&mut self, note: Note);
}

impl NoteSink for Arc<VoiceRegistry> {
    fn note_on(&mut self, note: Note) {
        self.press(note);
    }

    fn note_off(&mut self, note: Note) {
        self.release(note);
    }
}

/// Raw notification from a key source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(char),
    Up(char),
    Exit,
}

/// Cooperative shutdown flag, polled by the run loop between frames.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Turns level-style key notifications into note edges.
///
/// Key repeat and flaky sources deliver the same down (or up) many times;
/// only a not-held → held or held → not-held transition reaches the sink.
/// Unmapped keys are ignored.
pub struct InputBridge<S: NoteSink> {
    keymap: KeyMap,
    held: HashSet<char>,
    sink: S,
    stop: StopSignal,
}

impl<S: NoteSink> InputBridge<S> {
    pub fn new(keymap: KeyMap, sink: S, stop: StopSignal) -> Self {
        Self {
            keymap,
            held: HashSet::new(),
            sink,
            stop,
        }
    }

    pub fn on_key_down(&mut self, key: char) {
        let Some(note) = self.keymap.note_for(key) else {
            return;
        };
        if self.held.insert(key) {
            trace!("key '{key}' down -> press {note}");
            self.sink.note_on(note);
        }
    }

    pub fn on_key_up(&mut self, key: char) {
        if self.held.remove(&key) {
            if let Some(note) = self.keymap.note_for(key) {
                trace!("key '{key}' up -> release {note}");
                self.sink.note_off(note);
            }
        }
    }

    pub fn on_exit_key(&mut self) {
        self.stop.stop();
    }

    pub fn handle(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(key) => self.on_key_down(key),
            KeyEvent::Up(key) => self.on_key_up(key),
            KeyEvent::Exit => self.on_exit_key(),
        }
    }

    /// Release every held key, e.g. before shutting the stream down.
    pub fn release_all(&mut self) {
        let held: Vec<char> = self.held.iter().copied().collect();
        for key in held {
            self.on_key_up(key);
        }
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains(&key)
    }

    /// Notes whose keys are currently down.
    pub fn held_notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.held.iter().filter_map(|&k| self.keymap.note_for(k))
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
