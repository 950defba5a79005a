//! Rendered stills persisted as numbered PNG files.
//!
//! Each still is written to `<dir>/<output index>.png` before the renderer
//! moves on, then read back in index order for GIF assembly.

use super::gif_assembler::TimedStill;
use crate::render::{RenderedStill, Still, StillSink};
use crate::result::{ReelError, ReelResult};
use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    output_index: usize,
    delay_ms: f64,
}

/// Temporary directory of stills, removed on drop
#[derive(Debug)]
pub struct FrameStore {
    dir: TempDir,
    entries: Vec<Entry>,
}

impl FrameStore {
    /// Create a store in a fresh temporary directory
    pub fn new() -> ReelResult<Self> {
        let dir = tempfile::Builder::new().prefix("ttyreel-frames-").tempdir()?;
        Ok(Self {
            dir,
            entries: Vec::new(),
        })
    }

    /// Directory holding the PNG files
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// File path of an output index
    #[must_use]
    pub fn path_for(&self, output_index: usize) -> PathBuf {
        self.dir.path().join(format!("{output_index}.png"))
    }

    /// Number of stored stills
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write one still; indices must arrive in order
    pub fn write(&mut self, rendered: &RenderedStill) -> ReelResult<PathBuf> {
        if rendered.output_index != self.entries.len() {
            return Err(ReelError::invalid_state(format!(
                "expected still {}, got {}",
                self.entries.len(),
                rendered.output_index
            )));
        }
        let path = self.path_for(rendered.output_index);
        let image = RgbaImage::from_raw(
            rendered.still.width(),
            rendered.still.height(),
            rendered.still.rgba().to_vec(),
        )
        .ok_or_else(|| ReelError::image("Invalid still dimensions"))?;
        image.save_with_format(&path, ImageFormat::Png)?;
        trace!(path = %path.display(), "stored still");

        self.entries.push(Entry {
            output_index: rendered.output_index,
            delay_ms: rendered.delay,
        });
        Ok(path)
    }

    /// Read one still back
    pub fn read(&self, output_index: usize) -> ReelResult<Still> {
        let image = image::open(self.path_for(output_index))?.to_rgba8();
        let (width, height) = image.dimensions();
        Still::new(width, height, image.into_raw())
    }

    /// Stills with their delays in output order
    pub fn stills(&self) -> impl Iterator<Item = ReelResult<TimedStill>> + '_ {
        self.entries.iter().map(|entry| {
            Ok(TimedStill {
                delay_ms: entry.delay_ms,
                still: self.read(entry.output_index)?,
            })
        })
    }
}

#[async_trait]
impl StillSink for FrameStore {
    async fn accept(&mut self, rendered: RenderedStill) -> ReelResult<()> {
        self.write(&rendered).map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn rendered(output_index: usize, delay: f64, pixel: [u8; 4]) -> RenderedStill {
        RenderedStill {
            output_index,
            frame_index: output_index * 2,
            delay,
            still: Still::solid(3, 2, pixel).unwrap(),
        }
    }

    #[test]
    fn test_files_named_by_output_index() {
        let mut store = FrameStore::new().unwrap();
        let first = store.write(&rendered(0, 10.0, [1, 2, 3, 255])).unwrap();
        let second = store.write(&rendered(1, 20.0, [4, 5, 6, 255])).unwrap();
        assert_eq!(first, store.dir().join("0.png"));
        assert_eq!(second, store.dir().join("1.png"));
        assert!(second.is_file());
    }

    #[test]
    fn test_read_back_in_order() {
        let mut store = FrameStore::new().unwrap();
        store.write(&rendered(0, 10.0, [1, 2, 3, 255])).unwrap();
        store.write(&rendered(1, 20.0, [4, 5, 6, 255])).unwrap();

        let stills: Vec<TimedStill> = store.stills().collect::<ReelResult<_>>().unwrap();
        assert_eq!(stills.len(), 2);
        assert_eq!(stills[1].delay_ms, 20.0);
        assert_eq!(&stills[1].still.rgba()[0..4], &[4, 5, 6, 255]);
    }

    #[test]
    fn test_out_of_order_write_rejected() {
        let mut store = FrameStore::new().unwrap();
        let err = store.write(&rendered(1, 0.0, [0; 4])).unwrap_err();
        assert!(matches!(err, ReelError::InvalidState { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_directory_removed_on_drop() {
        let store = FrameStore::new().unwrap();
        let dir = store.dir().to_path_buf();
        assert!(dir.is_dir());
        drop(store);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_usable_as_still_sink() {
        let mut store = FrameStore::new().unwrap();
        store.accept(rendered(0, 5.0, [0; 4])).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
