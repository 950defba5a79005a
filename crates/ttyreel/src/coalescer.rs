//! Burst coalescing for live terminal output.
//!
//! A pseudo-terminal often splits one logical write into several reads a few
//! milliseconds apart. Chunks that arrive within [`COALESCE_THRESHOLD_MS`] of
//! the previous chunk are appended to the last frame instead of starting a new
//! one.

use crate::frame::{Frame, FrameSequence};
use tracing::trace;

/// Chunks closer than this to the previous chunk join the previous frame
pub const COALESCE_THRESHOLD_MS: u64 = 5;

/// Turns timestamped output chunks into an ordered frame list.
///
/// The timestamp used for the next duration is updated on every chunk, merged
/// or not. A merged frame keeps the delay it was created with.
#[derive(Debug)]
pub struct FrameCoalescer {
    last_record_ms: u64,
    frames: FrameSequence,
    merged_chunks: usize,
}

impl FrameCoalescer {
    /// Create a coalescer for a session that started at `session_start_ms`
    #[must_use]
    pub fn new(session_start_ms: u64) -> Self {
        Self {
            last_record_ms: session_start_ms,
            frames: FrameSequence::new(),
            merged_chunks: 0,
        }
    }

    /// Feed one output chunk that arrived at `now_ms`
    pub fn on_data(&mut self, chunk: &[u8], now_ms: u64) {
        let duration = now_ms.saturating_sub(self.last_record_ms);
        self.last_record_ms = now_ms;

        if duration < COALESCE_THRESHOLD_MS {
            if let Some(last) = self.frames.last_mut() {
                last.content.extend_from_slice(chunk);
                self.merged_chunks += 1;
                trace!(duration, bytes = chunk.len(), "merged chunk into last frame");
                return;
            }
        }

        self.frames.push(Frame::new(duration as f64, chunk));
    }

    /// Frames accumulated so far
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of chunks that were merged rather than starting a frame
    #[must_use]
    pub fn merged_chunks(&self) -> usize {
        self.merged_chunks
    }

    /// Freeze the accumulated frames. Consumes the coalescer.
    #[must_use]
    pub fn finalize(self) -> FrameSequence {
        self.frames
    }
}
