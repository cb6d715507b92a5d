pub mod analysis; // Spectral peak detection
pub mod config;
pub mod dsp;
pub mod error;
pub mod input; // Key events -> registry
pub mod io;
pub mod pitch;
pub mod synth; // Voices, registry and the render pass

pub use config::SynthConfig;
pub use error::{AudioError, ConfigError};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Level below which a released voice counts as silent and may be removed.
pub const SILENCE_EPSILON: f32 = 1e-6;
