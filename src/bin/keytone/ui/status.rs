//! Status bar widget - stream settings, held notes and output level

use keytone::pitch::Note;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::StatusInfo;

/// Bottom of the meter scale
const FLOOR_DBFS: f32 = -60.0;

/// Output level of the most recent scope buffer, in dBFS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputLevel {
    pub peak_dbfs: f32,
    pub rms_dbfs: f32,
}

impl OutputLevel {
    pub fn measure(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::silent();
        }
        let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let mean_square = samples.iter().map(|&x| x * x).sum::<f32>() / samples.len() as f32;
        Self {
            peak_dbfs: to_dbfs(peak),
            rms_dbfs: to_dbfs(mean_square.sqrt()),
        }
    }

    fn silent() -> Self {
        Self {
            peak_dbfs: FLOOR_DBFS,
            rms_dbfs: FLOOR_DBFS,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.peak_dbfs <= FLOOR_DBFS
    }
}

fn to_dbfs(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return FLOOR_DBFS;
    }
    (20.0 * amplitude.log10()).max(FLOOR_DBFS)
}

/// "A C# E", or "-" when nothing is held
fn held_label(held: &[Note]) -> String {
    if held.is_empty() {
        return "-".to_string();
    }
    held.iter()
        .map(|n| n.name())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    info: &StatusInfo,
    voices: usize,
    held: &[Note],
    level: &OutputLevel,
    dominant: Option<f32>,
) {
    let block = Block::default()
        .title(format!(" keytone - {} ", info.device_name))
        .borders(Borders::ALL);

    let pitch = match dominant {
        Some(hz) if !level.is_silent() => format!("{hz:.1} Hz"),
        _ => "-".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz/{}  ", info.sample_rate as f32 / 1000.0, info.block_size),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Voices: {voices:>2}  "),
            Style::default().fg(if voices > 0 { Color::Green } else { Color::White }),
        ),
        Span::styled(
            format!("Held: {}  ", held_label(held)),
            Style::default().fg(Color::Green),
        ),
        Span::styled(format!("Pitch: {pitch}  "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("Out: {:.1} dBFS (rms {:.1})", level.peak_dbfs, level.rms_dbfs),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_volume_reads_about_minus_fourteen() {
        let level = OutputLevel::measure(&[0.2, -0.2, 0.2, -0.2]);
        assert!((level.peak_dbfs + 13.98).abs() < 0.01);
        assert!((level.rms_dbfs - level.peak_dbfs).abs() < 1e-4);
        assert!(!level.is_silent());
    }

    #[test]
    fn silence_sits_on_the_floor() {
        assert!(OutputLevel::measure(&[]).is_silent());
        assert_eq!(OutputLevel::measure(&[0.0; 64]).peak_dbfs, FLOOR_DBFS);
        assert_eq!(OutputLevel::measure(&[1e-9; 64]).rms_dbfs, FLOOR_DBFS);
    }

    #[test]
    fn held_notes_label() {
        assert_eq!(held_label(&[]), "-");
        assert_eq!(held_label(&[Note::A, Note::CSharp, Note::HighC]), "A C# C'");
    }
}
