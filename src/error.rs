use std::{error::Error, fmt};

use crate::pitch::Note;

/// Rejected startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidReferenceFrequency(f64),
    InvalidAttack(f32),
    InvalidRelease(f32),
    InvalidMasterVolume(f32),
    InvalidBlockSize(usize),
    NoSampleRates,
    DuplicateKey(char),
    DuplicateNote(Note),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidReferenceFrequency(hz) => {
                write!(f, "reference frequency must be a positive number of Hz, got {hz}")
            }
            ConfigError::InvalidAttack(s) => write!(f, "attack must be >= 0 seconds, got {s}"),
            ConfigError::InvalidRelease(s) => write!(f, "release must be >= 0 seconds, got {s}"),
            ConfigError::InvalidMasterVolume(v) => {
                write!(f, "master volume must be within 0.0..=1.0, got {v}")
            }
            ConfigError::InvalidBlockSize(n) => write!(
                f,
                "block size must be within 1..={}, got {n}",
                crate::MAX_BLOCK_SIZE
            ),
            ConfigError::NoSampleRates => write!(f, "no candidate sample rates configured"),
            ConfigError::DuplicateKey(key) => write!(f, "key '{key}' is mapped more than once"),
            ConfigError::DuplicateNote(note) => {
                write!(f, "note {note} is mapped to more than one key")
            }
        }
    }
}

impl Error for ConfigError {}

/// Failure to bring up the audio output.
#[derive(Debug)]
pub enum AudioError {
    NoOutputDevice,
    NoCandidateRates,
    /// Every candidate rate was refused; `source` is the last device error.
    Unavailable {
        tried: Vec<u32>,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no default audio output device available"),
            AudioError::NoCandidateRates => write!(f, "no sample rates to try"),
            AudioError::Unavailable { tried, source } => {
                let rates: Vec<String> = tried.iter().map(|r| format!("{r} Hz")).collect();
                write!(
                    f,
                    "audio output refused every sample rate ({}): {source}",
                    rates.join(", ")
                )
            }
        }
    }
}

impl Error for AudioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AudioError::Unavailable { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
