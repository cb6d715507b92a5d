//! Key events in, registry mutations out.
//!
//! The key source (terminal, OS hook, test harness) reports raw key-down and
//! key-up notifications. [`InputBridge`] filters them down to edge
//! transitions on mapped keys and forwards those to a [`NoteSink`], normally
//! the shared voice registry.

pub mod bridge;
pub mod keymap;

pub use bridge::{InputBridge, KeyEvent, NoteSink, StopSignal};
pub use keymap::KeyMap;
