use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info, warn};

use super::SampleTap;
use crate::{
    config::SynthConfig,
    error::AudioError,
    synth::{RenderEngine, VoiceRegistry},
};

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Try `open` at each rate in order and keep the first that succeeds.
///
/// Fails with [`AudioError::Unavailable`] carrying the last error when every
/// rate is refused. Nothing is retried.
pub fn negotiate<T, E, F>(rates: &[u32], mut open: F) -> Result<(T, u32), AudioError>
where
    F: FnMut(u32) -> Result<T, E>,
    E: Into<BoxError>,
{
    let mut last_error = None;

    for &rate in rates {
        debug!("trying audio output at {rate} Hz");
        match open(rate) {
            Ok(opened) => {
                info!("audio output running at {rate} Hz");
                return Ok((opened, rate));
            }
            Err(err) => {
                let err = err.into();
                warn!("audio output refused {rate} Hz: {err}");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(source) => Err(AudioError::Unavailable {
            tried: rates.to_vec(),
            source,
        }),
        None => Err(AudioError::NoCandidateRates),
    }
}

/// A running mono output stream fed by a [`RenderEngine`].
///
/// The stream plays until this value is dropped.
pub struct AudioSink {
    _stream: cpal::Stream,
    sample_rate: u32,
    block_size: usize,
    device_name: String,
    stream_errors: Arc<AtomicUsize>,
}

impl AudioSink {
    /// Open the default output device at the first configured rate it accepts.
    pub fn open<T>(
        config: &SynthConfig,
        registry: Arc<VoiceRegistry>,
        tap: T,
    ) -> Result<Self, AudioError>
    where
        T: SampleTap + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown device".into());
        debug!("using output device {device_name}");

        let stream_errors = Arc::new(AtomicUsize::new(0));
        // Failed attempts drop their clone, so only the live stream ever
        // locks this and try_lock in the callback never contends.
        let tap = Arc::new(Mutex::new(tap));

        let (stream, sample_rate) = negotiate(&config.sample_rates, |rate| {
            build_stream(
                &device,
                config,
                rate,
                Arc::clone(&registry),
                Arc::clone(&tap),
                Arc::clone(&stream_errors),
            )
        })?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            block_size: config.block_size,
            device_name,
            stream_errors,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Errors reported by the backend since the stream started.
    pub fn stream_errors(&self) -> usize {
        self.stream_errors.load(Ordering::Relaxed)
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &SynthConfig,
    rate: u32,
    registry: Arc<VoiceRegistry>,
    tap: Arc<Mutex<T>>,
    errors: Arc<AtomicUsize>,
) -> Result<cpal::Stream, BoxError>
where
    T: SampleTap + 'static,
{
    let stream_config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(rate),
        buffer_size: cpal::BufferSize::Fixed(config.block_size as u32),
    };

    let mut engine = RenderEngine::new(registry, rate as f32, config);

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            engine.render_tick(data);
            if let Ok(mut tap) = tap.try_lock() {
                tap.push_block(data);
            }
        },
        move |err| {
            errors.fetch_add(1, Ordering::Relaxed);
            error!("audio stream error: {err}");
        },
        None,
    )?;
    stream.play()?;

    Ok(stream)
}
