//! Startup, the event loop and ordered shutdown

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{self, Event, KeyEventKind};
use keytone::{
    input::{InputBridge, KeyEvent, KeyMap, StopSignal},
    io::AudioSink,
    pitch::PitchTable,
    synth::VoiceRegistry,
    SynthConfig,
};
use log::info;
use rtrb::RingBuffer;

use super::{
    terminal::{translate, ReleaseFallback, TerminalSession},
    ui::{StatusInfo, UiApp},
};

/// Samples buffered between the audio callback and the scope
const TAP_CAPACITY: usize = 16_384;

/// ~60 fps redraw
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type Bridge = InputBridge<Arc<VoiceRegistry>>;

/// Owns the audio stream and the terminal for the length of a run.
///
/// Fields drop in declaration order, so the stream always stops before the
/// terminal is handed back, including when unwinding.
struct Running<A = AudioSink, T = TerminalSession> {
    sink: A,
    session: T,
}

/// Run the synthesizer until the exit key is pressed.
pub fn run(config: SynthConfig) -> EyreResult<()> {
    config
        .validate()
        .wrap_err("invalid synthesizer configuration")?;

    let pitch = PitchTable::new(config.reference_frequency)?;
    let registry = Arc::new(VoiceRegistry::new(pitch));

    // Open the device before taking over the terminal so a failure prints plainly
    let (tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_CAPACITY);
    let sink = AudioSink::open(&config, Arc::clone(&registry), tap_tx)
        .wrap_err("failed to open audio output")?;
    info!(
        "playing on {} at {} Hz, {} frames per block",
        sink.device_name(),
        sink.sample_rate(),
        sink.block_size()
    );

    let stop = StopSignal::new();
    let mut bridge = InputBridge::new(KeyMap::reference(), Arc::clone(&registry), stop.clone());

    let status = StatusInfo {
        sample_rate: sink.sample_rate(),
        block_size: sink.block_size(),
        device_name: sink.device_name().to_owned(),
        master_volume: config.master_volume,
    };
    let mut ui = UiApp::new(tap_rx, Arc::clone(&registry), status);

    let session = TerminalSession::enter().wrap_err("failed to set up the terminal")?;
    let mut running = Running { sink, session };

    let outcome = event_loop(&mut running.session, &mut bridge, &mut ui, &stop);

    bridge.release_all();
    let stream_errors = running.sink.stream_errors();
    drop(running);

    if stream_errors > 0 {
        info!("audio stream reported {stream_errors} error(s) while running");
    }
    info!("stopped");
    outcome
}

fn event_loop(
    session: &mut TerminalSession,
    bridge: &mut Bridge,
    ui: &mut UiApp,
    stop: &StopSignal,
) -> EyreResult<()> {
    let mut fallback = (!session.reports_releases())
        .then(|| ReleaseFallback::new(ReleaseFallback::DEFAULT_HOLD));

    while !stop.is_stopped() {
        ui.poll_audio();
        session.terminal().draw(|frame| ui.render(frame, bridge))?;

        if event::poll(FRAME_INTERVAL)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Release {
                        // Real releases are arriving after all
                        fallback = None;
                    }
                    if let Some(event) = translate(&key) {
                        if let (Some(fallback), KeyEvent::Down(c)) = (fallback.as_mut(), event) {
                            fallback.touch(c, Instant::now());
                        }
                        bridge.handle(event);
                    }
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if let Some(fallback) = fallback.as_mut() {
            fallback.expire(Instant::now(), bridge);
        }
    }

    Ok(())
}
