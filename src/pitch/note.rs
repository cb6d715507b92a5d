use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Note Identifiers
================

One chromatic octave starting at the reference pitch, plus the C one octave
above the first C:

  A  A#  B  C  C#  D  D#  E  F  F#  G  G#  | C'
  0  1   2  3  4   5  6   7  8  9   10 11  | (2 x C)

With the default 440 Hz reference this is A4 up to G#5, and HighC is C6.
The set is closed: every note has a slot in the pitch table and in the voice
registry, indexed by `Note::index`.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Note {
    A,
    ASharp,
    B,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    /// One octave above `C`.
    HighC,
}

impl Note {
    pub const COUNT: usize = 13;

    /// All notes in ascending pitch order.
    pub const ALL: [Note; Note::COUNT] = [
        Note::A,
        Note::ASharp,
        Note::B,
        Note::C,
        Note::CSharp,
        Note::D,
        Note::DSharp,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::G,
        Note::GSharp,
        Note::HighC,
    ];

    /// Dense index into per-note tables (0..COUNT).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Semitones above the reference pitch.
    pub fn semitones(self) -> u8 {
        match self {
            Note::HighC => Note::C.semitones() + 12,
            other => other as u8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::A => "A",
            Note::ASharp => "A#",
            Note::B => "B",
            Note::C => "C",
            Note::CSharp => "C#",
            Note::D => "D",
            Note::DSharp => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F#",
            Note::G => "G",
            Note::GSharp => "G#",
            Note::HighC => "C'",
        }
    }

    pub fn is_sharp(self) -> bool {
        self.name().ends_with('#')
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
