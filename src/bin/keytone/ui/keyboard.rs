//! Keyboard widget - one cell per mapped key
//!
//! Held keys are green, notes still fading after release are yellow.

use keytone::{
    input::{InputBridge, NoteSink},
    synth::VoiceRegistry,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const CELL_WIDTH: usize = 5;

pub fn render_keyboard<S: NoteSink>(
    frame: &mut Frame,
    area: Rect,
    bridge: &InputBridge<S>,
    registry: &VoiceRegistry,
) {
    let block = Block::default().title(" Keys ").borders(Borders::ALL);

    let mut keys = Vec::new();
    let mut notes = Vec::new();
    for (key, note) in bridge.keymap().iter() {
        let style = if bridge.is_held(key) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else if registry.is_present(note) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if note.is_sharp() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        keys.push(Span::styled(
            format!("{:^w$}", key.to_ascii_uppercase(), w = CELL_WIDTH),
            style,
        ));
        notes.push(Span::styled(
            format!("{:^w$}", note.name(), w = CELL_WIDTH),
            style,
        ));
    }

    let text = vec![Line::from(keys), Line::from(notes)];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
