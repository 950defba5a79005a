//! Frame rendering: cumulative terminal state, step sampling and still capture.
//!
//! [`FrameRenderer`] replays a normalized sequence into a [`CaptureSurface`]
//! strictly in order. Every frame's bytes are applied; only frames selected by
//! [`RenderStepState`] are captured. Each capture is handed to a [`StillSink`]
//! and awaited before the next frame is applied, so output indices never
//! collide.

#[cfg(feature = "media")]
pub mod palette;
#[cfg(feature = "media")]
pub mod raster;
#[cfg(feature = "media")]
pub mod terminal;

use crate::frame::FrameSequence;
use crate::result::{ReelError, ReelResult};
use async_trait::async_trait;
use tracing::{debug, info};

/// Which frames of a pass are captured.
///
/// Indices `0, step, 2*step, ...` are captured; `counter` is always in
/// `[0, step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStepState {
    step: usize,
    counter: usize,
}

impl RenderStepState {
    /// Create state for a pass. `step` must be at least 1.
    pub fn new(step: usize) -> ReelResult<Self> {
        if step == 0 {
            return Err(ReelError::invalid_config("render step must be at least 1"));
        }
        Ok(Self { step, counter: 0 })
    }

    /// Sampling step
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Position within the current step window
    #[must_use]
    pub const fn counter(&self) -> usize {
        self.counter
    }

    /// Decide for the next frame, then advance
    pub fn next_is_captured(&mut self) -> bool {
        let captured = self.counter == 0;
        self.counter = (self.counter + 1) % self.step;
        captured
    }

    /// Indices that a pass over `len` frames would capture
    #[must_use]
    pub fn sampled_indices(step: usize, len: usize) -> Vec<usize> {
        (0..len).step_by(step.max(1)).collect()
    }
}

/// Region of a surface to capture, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    /// Rectangle anchored at the origin
    #[must_use]
    pub const fn sized(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Straight-alpha RGBA8 still image
#[derive(Clone, PartialEq, Eq)]
pub struct Still {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Still {
    /// Wrap a pixel buffer; its length must be `width * height * 4`
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> ReelResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ReelError::image(format!(
                "still of {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Single-color still
    pub fn solid(width: u32, height: u32, pixel: [u8; 4]) -> ReelResult<Self> {
        let count = width as usize * height as usize;
        Self::new(width, height, pixel.repeat(count))
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data, row-major RGBA
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Consume into pixel data
    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Cut out `rect`, clipped to the image
    pub fn crop(self, rect: CaptureRect) -> ReelResult<Self> {
        if rect == CaptureRect::sized(self.width, self.height) {
            return Ok(self);
        }
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);
        if x0 == x1 || y0 == y1 {
            return Err(ReelError::capture(format!(
                "area {}x{} at ({}, {}) lies outside the {}x{} surface",
                rect.width, rect.height, rect.x, rect.y, self.width, self.height
            )));
        }
        let row_bytes = self.width as usize * 4;

        let mut rgba = Vec::with_capacity((x1 - x0) as usize * (y1 - y0) as usize * 4);
        for y in y0..y1 {
            let start = y as usize * row_bytes + x0 as usize * 4;
            let end = y as usize * row_bytes + x1 as usize * 4;
            rgba.extend_from_slice(&self.rgba[start..end]);
        }
        Self::new(x1 - x0, y1 - y0, rgba)
    }
}

impl std::fmt::Debug for Still {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Still")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Terminal-state model that can be captured as an image.
///
/// State is cumulative: `apply` is never followed by a reset within a pass.
#[async_trait]
pub trait CaptureSurface: Send {
    /// Feed raw terminal bytes
    fn apply(&mut self, content: &[u8]) -> ReelResult<()>;

    /// Full area of the surface
    fn bounds(&self) -> CaptureRect;

    /// Rasterize `rect` of the current state
    async fn capture(&mut self, rect: CaptureRect) -> ReelResult<Still>;
}

/// A captured still in output order
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStill {
    /// Sequential index among captured stills
    pub output_index: usize,
    /// Index of the source frame
    pub frame_index: usize,
    /// How long the still stays on screen, in ms
    pub delay: f64,
    pub still: Still,
}

/// Consumer of captured stills, typically persisting them to disk.
///
/// The renderer awaits `accept` before applying the next frame.
#[async_trait]
pub trait StillSink: Send {
    async fn accept(&mut self, rendered: RenderedStill) -> ReelResult<()>;
}

#[async_trait]
impl StillSink for Vec<RenderedStill> {
    async fn accept(&mut self, rendered: RenderedStill) -> ReelResult<()> {
        self.push(rendered);
        Ok(())
    }
}

/// "Frame N of M" notifications for a host progress indicator
pub trait RenderProgress: Send {
    /// `index` is zero-based
    fn on_frame(&mut self, index: usize, total: usize);
}

/// Progress reporter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl RenderProgress for NoProgress {
    fn on_frame(&mut self, _index: usize, _total: usize) {}
}

/// Result of one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    /// Frames applied
    pub frames: usize,
    /// Stills captured
    pub captured: usize,
    /// Dimensions of the first still, which fix the canvas
    pub canvas: Option<(u32, u32)>,
}

/// Drives a render pass
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    step: usize,
}

impl FrameRenderer {
    /// Create a renderer capturing every `step`-th frame
    pub fn new(step: usize) -> ReelResult<Self> {
        RenderStepState::new(step)?;
        Ok(Self { step })
    }

    /// Sampling step
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Render `sequence`, which must already be normalized
    pub async fn render<C, S, P>(
        &self,
        sequence: &FrameSequence,
        surface: &mut C,
        sink: &mut S,
        progress: &mut P,
    ) -> ReelResult<RenderSummary>
    where
        C: CaptureSurface + ?Sized,
        S: StillSink + ?Sized,
        P: RenderProgress + ?Sized,
    {
        let total = sequence.len();
        let mut state = RenderStepState::new(self.step)?;
        let mut rect: Option<CaptureRect> = None;
        let mut canvas = None;
        let mut captured = 0;

        info!(frames = total, step = self.step, "render started");

        for (index, frame) in sequence.iter().enumerate() {
            progress.on_frame(index, total);
            surface.apply(&frame.content)?;

            if !state.next_is_captured() {
                continue;
            }

            let area = *rect.get_or_insert_with(|| surface.bounds());
            let still = surface.capture(area).await?;
            canvas.get_or_insert((still.width(), still.height()));

            let delay = sequence.delay_after(index).unwrap_or(frame.delay);
            debug!(index, output_index = captured, delay, "captured still");
            sink.accept(RenderedStill {
                output_index: captured,
                frame_index: index,
                delay,
                still,
            })
            .await?;
            captured += 1;
        }

        info!(captured, "render finished");
        Ok(RenderSummary {
            frames: total,
            captured,
            canvas,
        })
    }
}
