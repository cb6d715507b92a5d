// Purpose - the audio device boundary

pub mod audio;
pub mod tap;

pub use audio::{negotiate, AudioSink};
pub use tap::SampleTap;
