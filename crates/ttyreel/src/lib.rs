//! Ttyreel: terminal recording and playback timing engine
//!
//! Records a command's terminal output as timed frames, replays them with
//! normalized delays, and renders them to an animated GIF or an HTML player.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   chunks    ┌────────────────┐   frames   ┌─────────────────┐
//! │ PTY reader   │────────────►│ FrameCoalescer │───────────►│ RecordingFile   │
//! │ (ClockSource)│             └────────────────┘            └────────┬────────┘
//! └──────────────┘                                                    │
//!                                         ┌───────────────────────────┘
//!                                         ▼
//!                                ┌─────────────────┐
//!                                │ DelayNormalizer │
//!                                └────────┬────────┘
//!                     ┌───────────────────┼────────────────────┐
//!                     ▼                   ▼                    ▼
//!           ┌───────────────────┐ ┌───────────────┐  ┌──────────────────┐
//!           │ PlaybackScheduler │ │ FrameRenderer │  │ WebPlayer        │
//!           │ (stdout)          │ │ → GifAssembler│  │ (HTML)           │
//!           └───────────────────┘ └───────────────┘  └──────────────────┘
//! ```
//!
//! The `pty` feature enables live recording; the `media` feature enables
//! terminal emulation, GIF output and the web player. Both are on by default.

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod clock;
pub mod coalescer;
pub mod config;
pub mod file;
pub mod frame;
pub mod normalize;
pub mod pty;
pub mod recorder;
pub mod render;
mod result;
pub mod scheduler;

#[cfg(feature = "media")]
pub mod media;
#[cfg(feature = "media")]
pub mod player;

pub use clock::{Clock, ClockSource, ManualClock, SystemClock};
pub use coalescer::{FrameCoalescer, COALESCE_THRESHOLD_MS};
pub use config::{ConfigDocument, CursorStyle, RecordingConfig, Theme};
pub use file::RecordingFile;
pub use frame::{Frame, FrameSequence};
pub use normalize::{normalize, DelayPolicy, PlaybackOptions, DEFAULT_MAX_IDLE_TIME_MS};
pub use pty::{split_command, PtyHandle, PtySpawner, PtySpec};
pub use recorder::{PtyEvent, Recorder, RecordingSession};
pub use render::{
    CaptureRect, CaptureSurface, FrameRenderer, NoProgress, RenderProgress, RenderStepState,
    RenderSummary, RenderedStill, Still, StillSink,
};
pub use result::{ReelError, ReelResult};
pub use scheduler::{CancelToken, FrameSink, PlaybackOutcome, PlaybackScheduler, WriterSink};

#[cfg(feature = "pty")]
pub use pty::NativePtySpawner;
#[cfg(feature = "pty")]
pub use recorder::{host_terminal_size, RawModeGuard};

#[cfg(feature = "media")]
pub use media::{AssembledGif, FrameStore, GifAssembler, GifOptions, TimedStill};
#[cfg(feature = "media")]
pub use player::WebPlayer;
#[cfg(feature = "media")]
pub use render::terminal::{SurfaceStyle, TerminalSurface};

/// Prelude for command implementations
pub mod prelude {
    pub use super::{
        normalize, CancelToken, ConfigDocument, Frame, FrameRenderer, FrameSequence,
        PlaybackOptions, PlaybackOutcome, PlaybackScheduler, RecordingConfig, RecordingFile,
        ReelError, ReelResult, WriterSink,
    };
}
