//! Note identifiers and their fixed frequencies.
//!
//! The table is computed once before audio starts and is read-only afterwards,
//! so it can be shared with the audio thread without any synchronisation.

mod note;
mod table;

pub use note::Note;
pub use table::PitchTable;
