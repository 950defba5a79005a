//! Sequential, delay-respecting frame emission.
//!
//! Frames are processed strictly one at a time: wait `frame.delay`
//! milliseconds, emit, and only schedule the next timer once the emit future
//! has completed. There is no internal timeout; a sink that never completes
//! stalls playback until the [`CancelToken`] fires.

use crate::frame::{Frame, FrameSequence};
use crate::result::ReelResult;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Receiver of scheduled frames.
///
/// Completing [`FrameSink::emit`] is the "frame done" signal that advances the
/// schedule.
#[async_trait]
pub trait FrameSink: Send {
    /// Emit frame `index`
    async fn emit(&mut self, index: usize, frame: &Frame) -> ReelResult<()>;

    /// Called exactly once after the last frame of a completed playback
    async fn finish(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

/// Cooperative cancellation shared between the scheduler and a signal handler
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Trigger cancellation; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is requested
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                // Sender is shared by every clone, so this only happens on teardown
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every frame was emitted and the sink finished
    Completed {
        /// Frames emitted
        frames: usize,
    },
    /// Cancellation fired before the last frame
    Cancelled {
        /// Frames emitted before cancellation
        emitted: usize,
    },
}

impl PlaybackOutcome {
    /// Whether playback ran to the end
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Drives frames into a [`FrameSink`] with their delays
#[derive(Debug, Clone, Default)]
pub struct PlaybackScheduler {
    cancel: CancelToken,
}

impl PlaybackScheduler {
    /// Create a scheduler with its own token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler observing an existing token
    #[must_use]
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Token that stops this scheduler
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Play `sequence` into `sink`.
    ///
    /// Sink errors are returned as-is; the scheduler does not interpret them.
    pub async fn play<S>(&self, sequence: &FrameSequence, sink: &mut S) -> ReelResult<PlaybackOutcome>
    where
        S: FrameSink + ?Sized,
    {
        info!(frames = sequence.len(), total_ms = sequence.total_delay(), "playback started");

        for (index, frame) in sequence.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(Self::cancelled_at(index));
            }

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Ok(Self::cancelled_at(index)),
                () = tokio::time::sleep(delay_duration(frame.delay)) => {}
            }

            sink.emit(index, frame).await?;
        }

        sink.finish().await?;
        info!(frames = sequence.len(), "playback completed");
        Ok(PlaybackOutcome::Completed {
            frames: sequence.len(),
        })
    }

    fn cancelled_at(emitted: usize) -> PlaybackOutcome {
        debug!(emitted, "playback cancelled");
        PlaybackOutcome::Cancelled { emitted }
    }
}

/// Convert a millisecond delay to a timer duration; negative and NaN become zero,
/// delays too long for a `Duration` saturate
#[must_use]
pub fn delay_duration(delay_ms: f64) -> Duration {
    Duration::try_from_secs_f64(delay_ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

/// Sink that writes raw frame bytes to a terminal-like writer
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> FrameSink for WriterSink<W> {
    async fn emit(&mut self, _index: usize, frame: &Frame) -> ReelResult<()> {
        self.writer.write_all(&frame.content)?;
        self.writer.flush()?;
        Ok(())
    }
}
