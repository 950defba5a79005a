//! Live recording: PTY output to coalesced frames.
//!
//! A reader thread stamps every chunk it reads from the pseudo-terminal and
//! sends it over a channel. [`RecordingSession`] is the only consumer, so the
//! coalescer has a single writer.

use crate::clock::Clock;
use crate::coalescer::FrameCoalescer;
use crate::frame::FrameSequence;
use crate::pty::{PtySpawner, PtySpec};
use crate::result::{ReelError, ReelResult};
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 8192;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What the reader thread reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyEvent {
    /// A chunk of output and the clock reading when it was read
    Data { bytes: Vec<u8>, at_ms: u64 },
    /// The terminal reached end of output
    Exit,
}

/// Start a thread that reads `reader` until EOF, then sends [`PtyEvent::Exit`].
///
/// A read error also ends the stream; on Linux the master side reports `EIO`
/// once the child has gone.
pub fn spawn_reader(
    mut reader: Box<dyn Read + Send>,
    clock: Clock,
    tx: mpsc::Sender<PtyEvent>,
) -> ReelResult<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("ttyreel-pty-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let event = PtyEvent::Data {
                            bytes: buf[..n].to_vec(),
                            at_ms: clock.now_ms(),
                        };
                        if tx.blocking_send(event).is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        debug!(error = %e, "pty read ended");
                        break;
                    }
                }
            }
            let _ = tx.blocking_send(PtyEvent::Exit);
        })?;
    Ok(handle)
}

/// Start a thread copying `input` into the terminal until either side closes.
///
/// The thread is detached by callers that read from a blocking stdin.
pub fn spawn_input_forwarder(
    mut input: Box<dyn Read + Send>,
    mut writer: Box<dyn Write + Send>,
) -> ReelResult<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("ttyreel-stdin".to_string())
        .spawn(move || {
            let mut buf = [0u8; 1024];
            loop {
                let n = match input.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if writer.write_all(&buf[..n]).and_then(|()| writer.flush()).is_err() {
                    break;
                }
            }
        })?;
    Ok(handle)
}

/// Consumes reader events: echoes output and feeds the coalescer
#[derive(Debug)]
pub struct RecordingSession<W> {
    coalescer: FrameCoalescer,
    echo: W,
    chunks: usize,
    bytes: usize,
}

impl<W: Write> RecordingSession<W> {
    /// Start a session whose first delay is measured from `start_ms`
    pub fn new(start_ms: u64, echo: W) -> Self {
        Self {
            coalescer: FrameCoalescer::new(start_ms),
            echo,
            chunks: 0,
            bytes: 0,
        }
    }

    /// Handle one event; returns `true` once the stream has ended
    pub fn on_event(&mut self, event: PtyEvent) -> ReelResult<bool> {
        match event {
            PtyEvent::Data { bytes, at_ms } => {
                self.echo.write_all(&bytes)?;
                self.echo.flush()?;
                self.chunks += 1;
                self.bytes += bytes.len();
                self.coalescer.on_data(&bytes, at_ms);
                Ok(false)
            }
            PtyEvent::Exit => Ok(true),
        }
    }

    /// Drain `events` until exit (or until every sender is gone)
    pub async fn run(mut self, events: &mut mpsc::Receiver<PtyEvent>) -> ReelResult<FrameSequence> {
        while let Some(event) = events.recv().await {
            if self.on_event(event)? {
                break;
            }
        }
        self.finish()
    }

    /// Freeze the frames; an empty session is an error
    pub fn finish(self) -> ReelResult<FrameSequence> {
        let merged = self.coalescer.merged_chunks();
        let frames = self.coalescer.finalize();
        info!(
            chunks = self.chunks,
            bytes = self.bytes,
            merged,
            frames = frames.len(),
            "recording finished"
        );
        if frames.is_empty() {
            return Err(ReelError::EmptyRecording);
        }
        Ok(frames)
    }
}

/// Spawns a command in a pseudo-terminal and records it
pub struct Recorder {
    spawner: Arc<dyn PtySpawner>,
    clock: Clock,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Recorder {
    /// Create a recorder
    pub fn new(spawner: Arc<dyn PtySpawner>, clock: Clock) -> Self {
        Self { spawner, clock }
    }

    /// Record `spec` until its output ends.
    ///
    /// Output is echoed to `echo` as it arrives. When `input` is given it is
    /// forwarded to the terminal from a detached thread.
    pub async fn record<W: Write>(
        &self,
        spec: &PtySpec,
        echo: W,
        input: Option<Box<dyn Read + Send>>,
    ) -> ReelResult<FrameSequence> {
        let mut handle = self.spawner.spawn(spec)?;
        let start_ms = self.clock.now_ms();
        info!(
            program = %spec.program,
            args = ?spec.args,
            cols = spec.cols,
            rows = spec.rows,
            "recording started"
        );

        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        spawn_reader(handle.take_reader()?, Arc::clone(&self.clock), tx)?;

        // Dropping the writer closes the terminal input, so it lives as long as the session
        let writer = handle.take_writer()?;
        let _held_writer = match input {
            Some(input) => {
                spawn_input_forwarder(input, writer)?;
                None
            }
            None => Some(writer),
        };

        let frames = RecordingSession::new(start_ms, echo).run(&mut rx).await;
        if frames.is_err() {
            if let Err(e) = handle.kill() {
                debug!(error = %e, "kill after failed session");
            }
        }
        match handle.wait() {
            Ok(code) => info!(exit_code = code, "process exited"),
            Err(e) => warn!(error = %e, "could not collect exit status"),
        }
        frames
    }
}

#[cfg(feature = "pty")]
pub use host::{host_terminal_size, RawModeGuard};

#[cfg(feature = "pty")]
mod host {
    use crate::result::ReelResult;
    use std::io::IsTerminal;
    use tracing::warn;

    /// Current size of the controlling terminal, if there is one
    pub fn host_terminal_size() -> Option<(u16, u16)> {
        crossterm::terminal::size()
            .ok()
            .filter(|(cols, rows)| *cols > 0 && *rows > 0)
    }

    /// Raw mode on the host terminal for the guard's lifetime
    #[derive(Debug)]
    pub struct RawModeGuard {
        enabled: bool,
    }

    impl RawModeGuard {
        /// Enable raw mode when stdin is a terminal; a no-op otherwise
        pub fn enable() -> ReelResult<Self> {
            if !std::io::stdin().is_terminal() {
                return Ok(Self { enabled: false });
            }
            crossterm::terminal::enable_raw_mode()?;
            Ok(Self { enabled: true })
        }

        /// Whether raw mode was actually switched on
        pub fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            if self.enabled {
                if let Err(e) = crossterm::terminal::disable_raw_mode() {
                    warn!(error = %e, "failed to restore terminal mode");
                }
            }
        }
    }
}
