//! Startup-time synthesizer settings.
//!
//! Everything here is fixed once the audio stream is open. Build with the
//! setters, then call [`SynthConfig::validate`] before handing it to the
//! engine or the audio sink.
//!
//! ```
//! use keytone::config::SynthConfig;
//!
//! let config = SynthConfig::new()
//!     .master_volume(0.3)
//!     .release_seconds(0.2)
//!     .sample_rates(&[48_000]);
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, MAX_BLOCK_SIZE};

pub const DEFAULT_REFERENCE_FREQUENCY: f64 = 440.0;
pub const DEFAULT_ATTACK_SECONDS: f32 = 0.01;
pub const DEFAULT_RELEASE_SECONDS: f32 = 0.05;
pub const DEFAULT_MASTER_VOLUME: f32 = 0.2;
pub const DEFAULT_BLOCK_SIZE: usize = 512;
/// Tried in order until the device accepts one.
pub const DEFAULT_SAMPLE_RATES: [u32; 2] = [44_100, 48_000];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Frequency of the first note (`Note::A`) in Hz
    pub reference_frequency: f64,
    /// Seconds to ramp a voice from silence to full level
    pub attack_seconds: f32,
    /// Seconds to ramp a voice from full level to silence
    pub release_seconds: f32,
    /// Output gain applied after polyphony normalisation (0.0 - 1.0)
    pub master_volume: f32,
    /// Frames per audio callback
    pub block_size: usize,
    /// Candidate device sample rates, in priority order
    pub sample_rates: Vec<u32>,
}

impl SynthConfig {
    pub fn new() -> Self {
        Self {
            reference_frequency: DEFAULT_REFERENCE_FREQUENCY,
            attack_seconds: DEFAULT_ATTACK_SECONDS,
            release_seconds: DEFAULT_RELEASE_SECONDS,
            master_volume: DEFAULT_MASTER_VOLUME,
            block_size: DEFAULT_BLOCK_SIZE,
            sample_rates: DEFAULT_SAMPLE_RATES.to_vec(),
        }
    }

    pub fn reference_frequency(mut self, hz: f64) -> Self {
        self.reference_frequency = hz;
        self
    }

    pub fn attack_seconds(mut self, seconds: f32) -> Self {
        self.attack_seconds = seconds;
        self
    }

    pub fn release_seconds(mut self, seconds: f32) -> Self {
        self.release_seconds = seconds;
        self
    }

    pub fn master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }

    pub fn block_size(mut self, frames: usize) -> Self {
        self.block_size = frames;
        self
    }

    pub fn sample_rates(mut self, rates: &[u32]) -> Self {
        self.sample_rates = rates.to_vec();
        self
    }

    /// Check every field, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.reference_frequency.is_finite() || self.reference_frequency <= 0.0 {
            return Err(ConfigError::InvalidReferenceFrequency(
                self.reference_frequency,
            ));
        }
        if !self.attack_seconds.is_finite() || self.attack_seconds < 0.0 {
            return Err(ConfigError::InvalidAttack(self.attack_seconds));
        }
        if !self.release_seconds.is_finite() || self.release_seconds < 0.0 {
            return Err(ConfigError::InvalidRelease(self.release_seconds));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::InvalidMasterVolume(self.master_volume));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        if self.sample_rates.is_empty() {
            return Err(ConfigError::NoSampleRates);
        }
        Ok(())
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::new()
    }
}
