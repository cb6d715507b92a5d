//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the per-sample
//! math; scheduling and mixing live in `synth`.

/// Linear attack/release envelope driven by a gate target.
pub mod envelope;
/// Sine phase accumulator.
pub mod oscillator;

pub use envelope::{GateEnvelope, RampSteps};
pub use oscillator::SineOscillator;
