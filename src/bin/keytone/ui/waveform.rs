//! Triggered oscilloscope
//!
//! The view starts at the first rising zero crossing in the buffer, so a held
//! chord stands still on screen instead of scrolling with every redraw.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Samples shown per frame; the rest of the buffer is trigger search room
const SCOPE_WINDOW: usize = 1024;

/// Index of the first upward crossing of zero, if there is one early enough
/// to leave a full `window` after it.
pub fn trigger_point(samples: &[f32], window: usize) -> Option<usize> {
    let last_start = samples.len().checked_sub(window)?;
    samples
        .windows(2)
        .take(last_start)
        .position(|pair| pair[0] < 0.0 && pair[1] >= 0.0)
        .map(|i| i + 1)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32], master_volume: f32) {
    let window = SCOPE_WINDOW.min(samples.len());
    let trigger = trigger_point(samples, window);
    let start = trigger.unwrap_or(samples.len() - window);
    let shown = &samples[start..start + window];

    let title = match trigger {
        Some(_) => " Output ",
        None => " Output (free-running) ",
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let data: Vec<(f64, f64)> = shown
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64, f64::from(s)))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    // Output is bounded by master volume; leave a little headroom above it
    let range = f64::from(master_volume.max(1e-3)) * 1.25;
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, window.max(1) as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
