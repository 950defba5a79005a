//! Animated GIF assembly from captured stills.

use crate::config::RecordingConfig;
use crate::render::{RenderProgress, Still};
use crate::result::{ReelError, ReelResult};
use gif::{Encoder, Frame, Repeat};
use image::imageops::FilterType;
use tracing::{debug, info};

/// Encoder settings taken from the recording config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    /// `0` loops forever, `-1` plays once, `n` repeats `n` times
    pub repeat: i32,
    /// 1 (fastest) to 100 (best)
    pub quality: u8,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            repeat: 0,
            quality: 100,
        }
    }
}

impl GifOptions {
    /// Take `repeat` and `quality` from a config
    #[must_use]
    pub fn from_config(config: &RecordingConfig) -> Self {
        Self {
            repeat: config.repeat,
            quality: config.quality,
        }
    }

    /// Override the quality, clamped to 1..=100
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Loop extension to write, `None` for play-once
    #[must_use]
    pub fn repeat_mode(&self) -> Option<Repeat> {
        match self.repeat {
            0 => Some(Repeat::Infinite),
            n if n < 0 => None,
            n => Some(Repeat::Finite(u16::try_from(n).unwrap_or(u16::MAX))),
        }
    }

    /// Map quality 1..=100 to NeuQuant speed 30..=1
    #[must_use]
    pub fn encoder_speed(&self) -> i32 {
        let normalized = i32::from(100 - self.quality.clamp(1, 100));
        (normalized * 29 / 99 + 1).clamp(1, 30)
    }
}

/// A still and how long it stays on screen
#[derive(Debug, Clone, PartialEq)]
pub struct TimedStill {
    pub delay_ms: f64,
    pub still: Still,
}

/// GIF delay in centiseconds
#[must_use]
pub fn delay_centiseconds(delay_ms: f64) -> u16 {
    (delay_ms.max(0.0) / 10.0).round().min(f64::from(u16::MAX)) as u16
}

/// Output of one assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledGif {
    pub width: u32,
    pub height: u32,
    pub frames: usize,
    pub bytes: Vec<u8>,
}

/// Encodes stills in output order into one animation
#[derive(Debug, Clone, Copy, Default)]
pub struct GifAssembler {
    options: GifOptions,
}

impl GifAssembler {
    /// Create an assembler
    #[must_use]
    pub fn new(options: GifOptions) -> Self {
        Self { options }
    }

    /// Encode `stills`; the first still fixes the canvas, later stills of
    /// another size are resized to it
    pub fn assemble<I, P>(&self, stills: I, total: usize, progress: &mut P) -> ReelResult<AssembledGif>
    where
        I: IntoIterator<Item = ReelResult<TimedStill>>,
        P: RenderProgress + ?Sized,
    {
        let mut stills = stills.into_iter();
        let first = stills
            .next()
            .ok_or_else(|| ReelError::invalid_state("no stills to assemble"))??;
        let (width, height) = (first.still.width(), first.still.height());
        let canvas_w = u16::try_from(width)
            .map_err(|_| ReelError::image(format!("canvas width {width} exceeds GIF limits")))?;
        let canvas_h = u16::try_from(height)
            .map_err(|_| ReelError::image(format!("canvas height {height} exceeds GIF limits")))?;

        let speed = self.options.encoder_speed();
        let mut bytes = Vec::new();
        let mut frames = 0;
        {
            let mut encoder = Encoder::new(&mut bytes, canvas_w, canvas_h, &[])
                .map_err(|e| ReelError::image(format!("Failed to create GIF encoder: {e}")))?;
            if let Some(repeat) = self.options.repeat_mode() {
                encoder
                    .set_repeat(repeat)
                    .map_err(|e| ReelError::image(format!("Failed to set GIF repeat: {e}")))?;
            }

            for timed in std::iter::once(Ok(first)).chain(stills) {
                let timed = timed?;
                progress.on_frame(frames, total);
                let mut rgba = fit_to_canvas(timed.still, width, height)?;
                let mut frame = Frame::from_rgba_speed(canvas_w, canvas_h, &mut rgba, speed);
                frame.delay = delay_centiseconds(timed.delay_ms);
                encoder
                    .write_frame(&frame)
                    .map_err(|e| ReelError::image(format!("Failed to write GIF frame: {e}")))?;
                debug!(frame = frames, delay_cs = frame.delay, "encoded frame");
                frames += 1;
            }
        }

        info!(frames, width, height, bytes = bytes.len(), "assembled GIF");
        Ok(AssembledGif {
            width,
            height,
            frames,
            bytes,
        })
    }
}

fn fit_to_canvas(still: Still, width: u32, height: u32) -> ReelResult<Vec<u8>> {
    if still.width() == width && still.height() == height {
        return Ok(still.into_rgba());
    }
    let source = image::RgbaImage::from_raw(still.width(), still.height(), still.into_rgba())
        .ok_or_else(|| ReelError::image("Invalid still dimensions"))?;
    Ok(image::imageops::resize(&source, width, height, FilterType::Triangle).into_raw())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::render::NoProgress;

    fn timed(delay_ms: f64, width: u32, height: u32, pixel: [u8; 4]) -> ReelResult<TimedStill> {
        Ok(TimedStill {
            delay_ms,
            still: Still::solid(width, height, pixel).unwrap(),
        })
    }

    fn decode(bytes: &[u8]) -> (u16, u16, Vec<u16>) {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(bytes).unwrap();
        let (w, h) = (decoder.width(), decoder.height());
        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
        }
        (w, h, delays)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_repeat_mapping() {
            let opts = |repeat| GifOptions {
                repeat,
                quality: 100,
            };
            assert_eq!(opts(0).repeat_mode(), Some(Repeat::Infinite));
            assert_eq!(opts(-1).repeat_mode(), None);
            assert_eq!(opts(3).repeat_mode(), Some(Repeat::Finite(3)));
        }

        #[test]
        fn test_quality_to_speed_bounds() {
            assert_eq!(GifOptions::default().with_quality(100).encoder_speed(), 1);
            assert_eq!(GifOptions::default().with_quality(1).encoder_speed(), 30);
            assert_eq!(GifOptions::default().with_quality(0).encoder_speed(), 30);
        }

        #[test]
        fn test_delay_rounding() {
            assert_eq!(delay_centiseconds(0.0), 0);
            assert_eq!(delay_centiseconds(14.0), 1);
            assert_eq!(delay_centiseconds(15.0), 2);
            assert_eq!(delay_centiseconds(2000.0), 200);
            assert_eq!(delay_centiseconds(-3.0), 0);
        }
    }

    mod assemble_tests {
        use super::*;

        #[test]
        fn test_delays_and_canvas() {
            let stills = vec![
                timed(100.0, 4, 3, [255, 0, 0, 255]),
                timed(250.0, 4, 3, [0, 255, 0, 255]),
            ];
            let gif = GifAssembler::default()
                .assemble(stills, 2, &mut NoProgress)
                .unwrap();
            assert_eq!((gif.width, gif.height, gif.frames), (4, 3, 2));
            assert_eq!(&gif.bytes[0..6], b"GIF89a");
            let (w, h, delays) = decode(&gif.bytes);
            assert_eq!((w, h), (4, 3));
            assert_eq!(delays, vec![10, 25]);
        }

        #[test]
        fn test_later_stills_resized_to_first() {
            let stills = vec![timed(10.0, 4, 4, [0; 4]), timed(10.0, 8, 2, [9, 9, 9, 255])];
            let gif = GifAssembler::default()
                .assemble(stills, 2, &mut NoProgress)
                .unwrap();
            let (w, h, delays) = decode(&gif.bytes);
            assert_eq!((w, h), (4, 4));
            assert_eq!(delays.len(), 2);
        }

        #[test]
        fn test_empty_input_rejected() {
            let result = GifAssembler::default().assemble(Vec::new(), 0, &mut NoProgress);
            assert!(matches!(result, Err(ReelError::InvalidState { .. })));
        }

        #[test]
        fn test_source_error_propagates() {
            let stills = vec![
                timed(10.0, 2, 2, [0; 4]),
                Err(ReelError::capture("store unreadable")),
            ];
            let result = GifAssembler::default().assemble(stills, 2, &mut NoProgress);
            assert!(matches!(result, Err(ReelError::Capture { .. })));
        }
    }
}
