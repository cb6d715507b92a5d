// Purpose: voices, the shared voice registry and the per-block render pass.
// Key events mutate the registry; the render engine reads it every block and
// owns all per-sample state.

pub mod engine;
pub mod registry;
pub mod voice;

pub use engine::RenderEngine;
pub use registry::{SlotState, VoiceRegistry};
pub use voice::Voice;
