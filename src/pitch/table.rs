use super::Note;
use crate::error::ConfigError;

/// Decimal places kept for every table frequency.
pub const FREQUENCY_DECIMALS: i32 = 6;

/// Round to the table precision.
fn round_frequency(hz: f64) -> f64 {
    let scale = 10f64.powi(FREQUENCY_DECIMALS);
    (hz * scale).round() / scale
}

/// Frequency lookup for the fixed note set.
///
/// Equal temperament around a reference: `f = F0 * 2^(k/12)` for semitone
/// offset `k`, rounded once to six decimals. `HighC` is the doubled, unrounded
/// `C` value rounded once, so it is exactly twice `C` up to that precision
/// rather than the end of an independently rounded semitone chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTable {
    frequencies: [f64; Note::COUNT],
}

impl PitchTable {
    pub fn new(reference_hz: f64) -> Result<Self, ConfigError> {
        if !reference_hz.is_finite() || reference_hz <= 0.0 {
            return Err(ConfigError::InvalidReferenceFrequency(reference_hz));
        }

        let mut frequencies = [0.0; Note::COUNT];
        for note in Note::ALL {
            let exact = match note {
                Note::HighC => 2.0 * equal_tempered(reference_hz, Note::C.semitones()),
                other => equal_tempered(reference_hz, other.semitones()),
            };
            frequencies[note.index()] = round_frequency(exact);
        }

        Ok(Self { frequencies })
    }

    /// Table from explicit frequencies, indexed by `Note::index`.
    ///
    /// No validation happens here; the render engine silences any voice whose
    /// frequency is not a positive finite number.
    pub fn from_frequencies(frequencies: [f64; Note::COUNT]) -> Self {
        Self { frequencies }
    }

    #[inline]
    pub fn frequency_of(&self, note: Note) -> f64 {
        self.frequencies[note.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Note, f64)> + '_ {
        Note::ALL.iter().map(move |&n| (n, self.frequency_of(n)))
    }
}

fn equal_tempered(reference_hz: f64, semitones: u8) -> f64 {
    reference_hz * 2f64.powf(f64::from(semitones) / 12.0)
}
