//! Terminal side of the key source: session setup and key translation.

use std::{
    collections::HashMap,
    io::{self, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use keytone::input::{InputBridge, KeyEvent, NoteSink};
use log::{debug, warn};
use ratatui::DefaultTerminal;

/// Raw mode, alternate screen and key-release reporting for as long as this
/// value lives. Dropping it puts the terminal back, on every exit path.
pub struct TerminalSession {
    terminal: DefaultTerminal,
    enhanced: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        // Ask before raw mode is on; the query toggles raw mode itself
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        let terminal = ratatui::try_init()?;

        if enhanced {
            if let Err(err) = execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            ) {
                ratatui::restore();
                return Err(err);
            }
        }
        debug!("terminal session started (key release events: {enhanced})");

        Ok(Self { terminal, enhanced })
    }

    /// Whether the terminal promised to report key releases.
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }

    pub fn terminal(&mut self) -> &mut DefaultTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.enhanced {
            if let Err(err) = execute!(stdout(), PopKeyboardEnhancementFlags) {
                warn!("failed to restore keyboard mode: {err}");
            }
        }
        ratatui::restore();
    }
}

/// Map a terminal key event onto the bridge's notifications.
pub fn translate(key: &TermKeyEvent) -> Option<KeyEvent> {
    let pressed = matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat);
    match key.code {
        KeyCode::Esc if pressed => Some(KeyEvent::Exit),
        KeyCode::Char('c') if pressed && key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyEvent::Exit)
        }
        KeyCode::Char(c) => {
            let c = c.to_ascii_lowercase();
            Some(if pressed { KeyEvent::Down(c) } else { KeyEvent::Up(c) })
        }
        _ => None,
    }
}

/// Stand-in key-up for terminals that only report presses.
///
/// A held key keeps auto-repeating; once the repeats stop for longer than
/// `hold` the key is treated as released. This has to outlast the initial
/// repeat delay, so short taps ring a little longer than pressed.
pub struct ReleaseFallback {
    last_seen: HashMap<char, Instant>,
    hold: Duration,
}

impl ReleaseFallback {
    pub const DEFAULT_HOLD: Duration = Duration::from_millis(650);

    pub fn new(hold: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            hold,
        }
    }

    pub fn touch(&mut self, key: char, now: Instant) {
        self.last_seen.insert(key, now);
    }

    /// Release every key that has gone quiet.
    pub fn expire<S: NoteSink>(&mut self, now: Instant, bridge: &mut InputBridge<S>) {
        let hold = self.hold;
        self.last_seen.retain(|&key, &mut seen| {
            let quiet = now.duration_since(seen) > hold;
            if quiet {
                bridge.on_key_up(key);
            }
            !quiet
        });
    }
}
