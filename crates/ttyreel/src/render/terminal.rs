//! Headless terminal emulation backed by `alacritty_terminal`.
//!
//! The parser and grid persist for the lifetime of the surface, so an escape
//! sequence split across two frames is still interpreted correctly.

use super::palette::{brighten, dim, Palette};
use super::raster::{svg_document, Rasterizer};
use super::{CaptureRect, CaptureSurface, Still};
use crate::config::{CursorStyle, RecordingConfig};
use crate::result::ReelResult;
use alacritty_terminal::event::VoidListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::cell::{Cell, Flags};
use alacritty_terminal::term::{Config, Term, TermMode};
use alacritty_terminal::vte::ansi::{self, Rgb};
use async_trait::async_trait;
use tracing::trace;

/// Width of a cell relative to the font size
pub const CELL_WIDTH_EM: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
struct GridSize {
    columns: usize,
    lines: usize,
}

impl Dimensions for GridSize {
    fn total_lines(&self) -> usize {
        self.lines
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn columns(&self) -> usize {
        self.columns
    }
}

/// Visual parameters shared by the rasterizer and the web player
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceStyle {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: u32,
    pub cursor_style: CursorStyle,
    pub palette: Palette,
}

impl SurfaceStyle {
    /// Take the visual settings of a recording config
    pub fn from_config(config: &RecordingConfig) -> ReelResult<Self> {
        Ok(Self {
            font_family: config.font_family.clone(),
            font_size: config.font_size.max(1.0),
            line_height: config.line_height.max(0.5),
            padding: config.padding,
            cursor_style: config.cursor_style,
            palette: Palette::from_theme(&config.theme)?,
        })
    }

    /// Cell width and height in pixels
    #[must_use]
    pub fn cell_size(&self) -> (f32, f32) {
        (self.font_size * CELL_WIDTH_EM, self.font_size * self.line_height)
    }

    /// Canvas size for a grid
    #[must_use]
    pub fn pixel_size(&self, columns: usize, lines: usize) -> (u32, u32) {
        let (cell_w, cell_h) = self.cell_size();
        let pad = self.padding as f32 * 2.0;
        (
            (columns as f32).mul_add(cell_w, pad).round() as u32,
            (lines as f32).mul_add(cell_h, pad).round() as u32,
        )
    }
}

/// Run of adjacent cells sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub column: usize,
    /// Width in cells
    pub width: usize,
    pub text: String,
    pub fg: Rgb,
    /// `None` is the default background
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
}

impl StyledRun {
    fn same_style(&self, other: &Self) -> bool {
        self.fg == other.fg
            && self.bg == other.bg
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikeout == other.strikeout
    }

    /// Whether the run draws nothing on the default background
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.bg.is_none() && !self.underline && !self.strikeout && self.text.trim().is_empty()
    }
}

/// Cursor position when visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMark {
    pub line: usize,
    pub column: usize,
}

/// Styled content of the visible grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    pub columns: usize,
    pub lines: Vec<Vec<StyledRun>>,
    pub cursor: Option<CursorMark>,
}

impl GridSnapshot {
    /// Plain text of each line with trailing spaces removed
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|runs| {
                let line: String = runs.iter().map(|r| r.text.as_str()).collect();
                line.trim_end().to_string()
            })
            .collect()
    }
}

/// Terminal state model that rasterizes its visible grid
pub struct TerminalSurface {
    term: Term<VoidListener>,
    parser: ansi::Processor,
    size: GridSize,
    style: SurfaceStyle,
    rasterizer: Rasterizer,
}

impl std::fmt::Debug for TerminalSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface")
            .field("columns", &self.size.columns)
            .field("lines", &self.size.lines)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl TerminalSurface {
    /// Create an empty terminal of `columns` x `lines`
    #[must_use]
    pub fn new(columns: u16, lines: u16, style: SurfaceStyle, rasterizer: Rasterizer) -> Self {
        let size = GridSize {
            columns: usize::from(columns.max(1)),
            lines: usize::from(lines.max(1)),
        };
        Self {
            term: Term::new(Config::default(), &size, VoidListener),
            parser: ansi::Processor::new(),
            size,
            style,
            rasterizer,
        }
    }

    /// Terminal sized and styled from a recording config, using system fonts
    pub fn from_config(config: &RecordingConfig) -> ReelResult<Self> {
        let (columns, lines) = config.size();
        Ok(Self::new(
            columns,
            lines,
            SurfaceStyle::from_config(config)?,
            Rasterizer::with_system_fonts(),
        ))
    }

    /// Feed raw bytes into the persistent parser
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.advance(&mut self.term, bytes);
    }

    /// Visual style
    #[must_use]
    pub fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    /// Canvas size in pixels
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        self.style.pixel_size(self.size.columns, self.size.lines)
    }

    /// Styled content of the visible screen
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        let grid = self.term.grid();
        let palette = &self.style.palette;
        let columns = self.term.columns();
        let screen_lines = self.term.screen_lines();

        let lines = (0..screen_lines)
            .map(|line| {
                let row = &grid[Line(line as i32)];
                let mut runs: Vec<StyledRun> = Vec::new();
                for column in 0..columns {
                    let cell = &row[Column(column)];
                    if cell.flags.contains(Flags::WIDE_CHAR_SPACER) {
                        continue;
                    }
                    let run = styled_cell(cell, column, palette);
                    match runs.last_mut() {
                        Some(last) if last.same_style(&run) && last.column + last.width == column => {
                            last.text.push_str(&run.text);
                            last.width += run.width;
                        }
                        _ => runs.push(run),
                    }
                }
                runs
            })
            .collect();

        let cursor = self.term.mode().contains(TermMode::SHOW_CURSOR).then(|| {
            let point = grid.cursor.point;
            CursorMark {
                line: point.line.0.max(0) as usize,
                column: point.column.0.min(columns.saturating_sub(1)),
            }
        });

        GridSnapshot {
            columns,
            lines,
            cursor,
        }
    }
}

fn styled_cell(cell: &Cell, column: usize, palette: &Palette) -> StyledRun {
    let flags = cell.flags;
    let bold = flags.contains(Flags::BOLD);
    let fg_color = if bold { brighten(cell.fg) } else { cell.fg };
    let mut fg = palette.resolve(fg_color);
    let mut bg = match cell.bg {
        ansi::Color::Named(ansi::NamedColor::Background) => None,
        other => Some(palette.resolve(other)),
    };

    if flags.contains(Flags::INVERSE) {
        let old_bg = bg.unwrap_or(palette.background);
        bg = Some(fg);
        fg = old_bg;
    }
    if flags.contains(Flags::DIM) {
        fg = dim(fg);
    }
    if flags.contains(Flags::HIDDEN) {
        fg = bg.unwrap_or(palette.background);
    }

    let mut text = String::new();
    text.push(if cell.c.is_control() { ' ' } else { cell.c });
    if let Some(extra) = cell.zerowidth() {
        text.extend(extra.iter().filter(|c| !c.is_control()));
    }

    StyledRun {
        column,
        width: if flags.contains(Flags::WIDE_CHAR) { 2 } else { 1 },
        text,
        fg,
        bg,
        bold,
        italic: flags.contains(Flags::ITALIC),
        underline: flags.intersects(Flags::UNDERLINE | Flags::DOUBLE_UNDERLINE),
        strikeout: flags.contains(Flags::STRIKEOUT),
    }
}

#[async_trait]
impl CaptureSurface for TerminalSurface {
    fn apply(&mut self, content: &[u8]) -> ReelResult<()> {
        self.feed(content);
        Ok(())
    }

    fn bounds(&self) -> CaptureRect {
        let (width, height) = self.pixel_size();
        CaptureRect::sized(width, height)
    }

    async fn capture(&mut self, rect: CaptureRect) -> ReelResult<Still> {
        let svg = svg_document(&self.snapshot(), &self.style)?;
        trace!(bytes = svg.len(), "rasterizing grid");
        self.rasterizer.rasterize(&svg)?.crop(rect)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn surface(columns: u16, lines: u16) -> TerminalSurface {
        let style = SurfaceStyle::from_config(&RecordingConfig::default()).unwrap();
        TerminalSurface::new(columns, lines, style, Rasterizer::without_fonts())
    }

    mod emulation_tests {
        use super::*;

        #[test]
        fn test_plain_text_lands_in_grid() {
            let mut term = surface(20, 3);
            term.feed(b"$ ls\r\nCargo.toml");
            let lines = term.snapshot().text_lines();
            assert_eq!(lines[0], "$ ls");
            assert_eq!(lines[1], "Cargo.toml");
            assert_eq!(lines[2], "");
        }

        #[test]
        fn test_state_carries_across_feeds() {
            let mut term = surface(20, 2);
            term.feed(b"one ");
            term.feed(b"two");
            assert_eq!(term.snapshot().text_lines()[0], "one two");
        }

        #[test]
        fn test_escape_split_across_frames() {
            let mut term = surface(20, 2);
            term.feed(b"\x1b[3");
            term.feed(b"1mred\x1b[0m");
            let snapshot = term.snapshot();
            let red = term.style().palette.indexed(1);
            let run = snapshot.lines[0].iter().find(|r| r.text.starts_with("red")).unwrap();
            assert_eq!(run.fg, red);
            assert_eq!(snapshot.text_lines()[0], "red");
        }

        #[test]
        fn test_clear_screen() {
            let mut term = surface(10, 2);
            term.feed(b"junk\r\nmore");
            term.feed(b"\x1b[2J\x1b[H");
            assert!(term.snapshot().text_lines().iter().all(String::is_empty));
        }

        #[test]
        fn test_inverse_swaps_colors() {
            let mut term = surface(10, 1);
            term.feed(b"\x1b[7mX");
            let style = term.style().clone();
            let run = term.snapshot().lines[0][0].clone();
            assert_eq!(run.bg, Some(style.palette.foreground));
            assert_eq!(run.fg, style.palette.background);
        }

        #[test]
        fn test_cursor_tracks_position() {
            let mut term = surface(10, 3);
            term.feed(b"ab\r\nc");
            assert_eq!(term.snapshot().cursor, Some(CursorMark { line: 1, column: 1 }));
            term.feed(b"\x1b[?25l");
            assert_eq!(term.snapshot().cursor, None);
        }

        #[test]
        fn test_runs_merge_same_style() {
            let mut term = surface(8, 1);
            term.feed(b"abc\x1b[1mde");
            let runs = &term.snapshot().lines[0];
            assert_eq!(runs[0].text, "abc");
            assert_eq!(runs[1].text, "de");
            assert!(runs[1].bold);
        }
    }

    mod capture_tests {
        use super::*;

        #[test]
        fn test_pixel_size_from_font_metrics() {
            let term = surface(80, 24);
            // 80 * 7.2 + 20, 24 * 14.4 + 20
            assert_eq!(term.pixel_size(), (596, 366));
        }

        #[tokio::test]
        async fn test_capture_matches_bounds() {
            let mut term = surface(10, 2);
            term.apply(b"hi").unwrap();
            let bounds = term.bounds();
            let still = term.capture(bounds).await.unwrap();
            assert_eq!((still.width(), still.height()), (bounds.width, bounds.height));
        }

        #[tokio::test]
        async fn test_capture_paints_background() {
            let mut term = surface(4, 1);
            let bounds = term.bounds();
            let still = term.capture(bounds).await.unwrap();
            let bg = term.style().palette.background;
            assert_eq!(&still.rgba()[0..4], &[bg.r, bg.g, bg.b, 255]);
        }
    }
}
