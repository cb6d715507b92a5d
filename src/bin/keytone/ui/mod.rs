//! Status view for keytone
//!
//! Shows which keys are down, which notes are still sounding, and a scope of
//! the audio actually sent to the device.

mod keyboard;
mod status;
mod waveform;

use std::sync::Arc;

use keytone::{
    analysis::PeakFinder,
    input::{InputBridge, NoteSink},
    synth::VoiceRegistry,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use rtrb::Consumer;

use keyboard::render_keyboard;
use status::{render_status, OutputLevel};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 2048;

/// Fixed facts about the running stream
pub struct StatusInfo {
    pub sample_rate: u32,
    pub block_size: usize,
    pub device_name: String,
    pub master_volume: f32,
}

pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    registry: Arc<VoiceRegistry>,
    info: StatusInfo,
    /// Most recent VIS_BUFFER_SIZE samples
    audio_buffer: Vec<f32>,
    peak_finder: PeakFinder,
    dominant: Option<f32>,
}

impl UiApp {
    pub fn new(audio_rx: Consumer<f32>, registry: Arc<VoiceRegistry>, info: StatusInfo) -> Self {
        Self {
            audio_rx,
            registry,
            info,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            peak_finder: PeakFinder::new(VIS_BUFFER_SIZE),
            dominant: None,
        }
    }

    /// Drain the tap, keeping only the newest samples
    pub fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }
        if !received {
            return;
        }

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
        self.dominant = self
            .peak_finder
            .dominant_frequency(&self.audio_buffer, self.info.sample_rate as f32);
    }

    pub fn render<S: NoteSink>(&self, frame: &mut Frame, bridge: &InputBridge<S>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(4), // Keyboard
                Constraint::Min(6),    // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let level = OutputLevel::measure(&self.audio_buffer);
        let mut held: Vec<_> = bridge.held_notes().collect();
        held.sort_by_key(|n| n.index());
        render_status(
            frame,
            chunks[0],
            &self.info,
            self.registry.active_count(),
            &held,
            &level,
            self.dominant,
        );
        render_keyboard(frame, chunks[1], bridge, &self.registry);
        render_waveform(frame, chunks[2], &self.audio_buffer, self.info.master_volume);

        let keys: String = bridge
            .keymap()
            .iter()
            .map(|(k, _)| format!("{} ", k.to_ascii_uppercase()))
            .collect();
        let help = Paragraph::new(format!(" Play: {keys}  [Esc] Quit"))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
