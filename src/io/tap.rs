#[cfg(feature = "rtrb")]
use rtrb::Producer;

/// Copy of rendered audio leaving the audio callback (for scopes, meters).
///
/// Implementations are called from the realtime thread: they must not block
/// or allocate, and should drop samples rather than wait for room.
pub trait SampleTap: Send {
    fn push_block(&mut self, block: &[f32]);
}

/// No tap.
impl SampleTap for () {
    fn push_block(&mut self, _block: &[f32]) {}
}

#[cfg(feature = "rtrb")]
impl SampleTap for Producer<f32> {
    fn push_block(&mut self, block: &[f32]) {
        let n = block.len().min(self.slots());
        if n == 0 {
            return;
        }
        if let Ok(chunk) = self.write_chunk_uninit(n) {
            chunk.fill_from_iter(block[..n].iter().copied());
        }
    }
}
