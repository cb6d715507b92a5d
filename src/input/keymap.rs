use crate::{error::ConfigError, pitch::Note};

/// Reference layout: the home and top rows of an AZERTY keyboard, laid out
/// like piano keys (sharps on the upper row).
pub const REFERENCE_LAYOUT: [(char, Note); Note::COUNT] = [
    ('q', Note::A),
    ('z', Note::ASharp),
    ('s', Note::B),
    ('e', Note::C),
    ('d', Note::CSharp),
    ('f', Note::D),
    ('t', Note::DSharp),
    ('g', Note::E),
    ('y', Note::F),
    ('h', Note::FSharp),
    ('u', Note::G),
    ('j', Note::GSharp),
    ('k', Note::HighC),
];

/// Injective key → note table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    entries: Vec<(char, Note)>,
}

impl KeyMap {
    /// Build a map, rejecting a key or a note that appears twice.
    pub fn new(entries: impl IntoIterator<Item = (char, Note)>) -> Result<Self, ConfigError> {
        let mut checked: Vec<(char, Note)> = Vec::new();
        for (key, note) in entries {
            if checked.iter().any(|&(k, _)| k == key) {
                return Err(ConfigError::DuplicateKey(key));
            }
            if checked.iter().any(|&(_, n)| n == note) {
                return Err(ConfigError::DuplicateNote(note));
            }
            checked.push((key, note));
        }
        Ok(Self { entries: checked })
    }

    pub fn reference() -> Self {
        Self {
            entries: REFERENCE_LAYOUT.to_vec(),
        }
    }

    pub fn note_for(&self, key: char) -> Option<Note> {
        self.entries
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, n)| n)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (char, Note)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::reference()
    }
}
