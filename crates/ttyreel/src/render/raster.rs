//! Grid snapshot to SVG to RGBA still.

use super::palette::css;
use super::terminal::{GridSnapshot, StyledRun, SurfaceStyle};
use super::Still;
use crate::config::CursorStyle;
use crate::result::{ReelError, ReelResult};
use resvg::{tiny_skia, usvg};
use std::fmt::Write as FmtWrite;

/// Baseline offset inside a line box, as a fraction of the font size
const BASELINE_EM: f32 = 0.8;

fn fmt_error(e: std::fmt::Error) -> ReelError {
    ReelError::image(e.to_string())
}

/// Build the SVG document for one snapshot: background, cell backgrounds,
/// text runs, cursor
pub fn svg_document(snapshot: &GridSnapshot, style: &SurfaceStyle) -> ReelResult<String> {
    let (width, height) = style.pixel_size(snapshot.columns, snapshot.lines.len());
    let (cell_w, cell_h) = style.cell_size();
    let pad = style.padding as f32;
    let mut svg = String::with_capacity(4096);

    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">"
    )
    .map_err(fmt_error)?;
    writeln!(
        svg,
        "<rect width=\"{width}\" height=\"{height}\" fill=\"{}\"/>",
        css(style.palette.background)
    )
    .map_err(fmt_error)?;

    for (row, runs) in snapshot.lines.iter().enumerate() {
        let top = (row as f32).mul_add(cell_h, pad);
        for (run, bg) in runs.iter().filter_map(|r| r.bg.map(|bg| (r, bg))) {
            writeln!(
                svg,
                "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{cell_h:.2}\" fill=\"{}\"/>",
                (run.column as f32).mul_add(cell_w, pad),
                run.width as f32 * cell_w,
                css(bg)
            )
            .map_err(fmt_error)?;
        }
    }

    if let Some(cursor) = snapshot.cursor {
        let x = (cursor.column as f32).mul_add(cell_w, pad);
        let y = (cursor.line as f32).mul_add(cell_h, pad);
        let (w, h, dy) = match style.cursor_style {
            CursorStyle::Block => (cell_w, cell_h, 0.0),
            CursorStyle::Underline => (cell_w, 2.0, cell_h - 2.0),
            CursorStyle::Bar => (2.0, cell_h, 0.0),
        };
        writeln!(
            svg,
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{}\"/>",
            y + dy,
            css(style.palette.cursor)
        )
        .map_err(fmt_error)?;
    }

    writeln!(
        svg,
        "<g font-family=\"{}\" font-size=\"{}\" xml:space=\"preserve\">",
        escape_xml(&style.font_family),
        style.font_size
    )
    .map_err(fmt_error)?;
    let baseline = (cell_h - style.font_size).mul_add(0.5, style.font_size * BASELINE_EM);
    for (row, runs) in snapshot.lines.iter().enumerate() {
        let y = (row as f32).mul_add(cell_h, pad) + baseline;
        for run in runs.iter().filter(|r| !r.text.trim().is_empty()) {
            text_element(&mut svg, run, y, cell_w, pad)?;
        }
    }
    svg.push_str("</g>\n</svg>\n");
    Ok(svg)
}

fn text_element(svg: &mut String, run: &StyledRun, y: f32, cell_w: f32, pad: f32) -> ReelResult<()> {
    let mut attrs = String::new();
    if run.bold {
        attrs.push_str(" font-weight=\"bold\"");
    }
    if run.italic {
        attrs.push_str(" font-style=\"italic\"");
    }
    match (run.underline, run.strikeout) {
        (true, true) => attrs.push_str(" text-decoration=\"underline line-through\""),
        (true, false) => attrs.push_str(" text-decoration=\"underline\""),
        (false, true) => attrs.push_str(" text-decoration=\"line-through\""),
        (false, false) => {}
    }
    writeln!(
        svg,
        "<text x=\"{:.2}\" y=\"{y:.2}\" fill=\"{}\" textLength=\"{:.2}\" lengthAdjust=\"spacingAndGlyphs\" xml:space=\"preserve\"{attrs}>{}</text>",
        (run.column as f32).mul_add(cell_w, pad),
        css(run.fg),
        run.width as f32 * cell_w,
        escape_xml(&run.text)
    )
    .map_err(fmt_error)
}

/// Escape text for XML and HTML content or attributes
#[must_use]
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// SVG rasterizer holding a font database
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("fonts", &self.options.fontdb.len())
            .finish()
    }
}

impl Rasterizer {
    /// Load the fonts installed on this machine
    #[must_use]
    pub fn with_system_fonts() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        tracing::debug!(fonts = options.fontdb.len(), "loaded system fonts");
        Self { options }
    }

    /// No fonts: text is skipped, shapes still render
    #[must_use]
    pub fn without_fonts() -> Self {
        Self {
            options: usvg::Options::default(),
        }
    }

    /// Render an SVG document into a straight-alpha still
    pub fn rasterize(&self, svg: &str) -> ReelResult<Still> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| ReelError::image(format!("invalid SVG: {e}")))?;
        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| ReelError::image(format!("cannot allocate {}x{} canvas", size.width(), size.height())))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Still::new(size.width(), size.height(), rgba)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::RecordingConfig;
    use crate::render::terminal::CursorMark;
    use alacritty_terminal::vte::ansi::Rgb;

    fn style() -> SurfaceStyle {
        SurfaceStyle::from_config(&RecordingConfig::default()).unwrap()
    }

    fn run(column: usize, text: &str, bg: Option<Rgb>) -> StyledRun {
        StyledRun {
            column,
            width: text.chars().count(),
            text: text.to_string(),
            fg: Rgb { r: 255, g: 255, b: 255 },
            bg,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
        }
    }

    fn snapshot(lines: Vec<Vec<StyledRun>>, cursor: Option<CursorMark>) -> GridSnapshot {
        GridSnapshot {
            columns: 10,
            lines,
            cursor,
        }
    }

    mod svg_tests {
        use super::*;

        #[test]
        fn test_escapes_text() {
            let svg = svg_document(&snapshot(vec![vec![run(0, "a<b&c", None)]], None), &style()).unwrap();
            assert!(svg.contains(">a&lt;b&amp;c</text>"));
        }

        #[test]
        fn test_blank_runs_emit_no_text() {
            let svg = svg_document(&snapshot(vec![vec![run(0, "    ", None)]], None), &style()).unwrap();
            assert!(!svg.contains("<text"));
        }

        #[test]
        fn test_background_rect_per_colored_run() {
            let red = Rgb { r: 255, g: 0, b: 0 };
            let svg =
                svg_document(&snapshot(vec![vec![run(2, "ok", Some(red))]], None), &style()).unwrap();
            assert!(svg.contains("fill=\"#ff0000\""));
            assert_eq!(svg.matches("<rect").count(), 2);
        }

        #[test]
        fn test_cursor_drawn_when_visible() {
            let cursor = Some(CursorMark { line: 0, column: 1 });
            let svg = svg_document(&snapshot(vec![Vec::new()], cursor), &style()).unwrap();
            let cursor_fill = format!("fill=\"{}\"", css(style().palette.cursor));
            assert!(svg.contains(&cursor_fill));
        }

        #[test]
        fn test_xml_escape_all() {
            assert_eq!(escape_xml("<>&\"'"), "&lt;&gt;&amp;&quot;&apos;");
        }
    }

    mod raster_tests {
        use super::*;

        #[test]
        fn test_rasterize_solid_rect() {
            let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"4\" height=\"3\">\
                       <rect width=\"4\" height=\"3\" fill=\"#102030\"/></svg>";
            let still = Rasterizer::without_fonts().rasterize(svg).unwrap();
            assert_eq!((still.width(), still.height()), (4, 3));
            assert_eq!(&still.rgba()[0..4], &[0x10, 0x20, 0x30, 255]);
        }

        #[test]
        fn test_rasterize_rejects_garbage() {
            let err = Rasterizer::without_fonts().rasterize("<not svg").unwrap_err();
            assert!(matches!(err, ReelError::ImageProcessing { .. }));
        }

        #[test]
        fn test_document_size_matches_style() {
            let style = style();
            let doc = svg_document(&snapshot(vec![Vec::new(); 2], None), &style).unwrap();
            let still = Rasterizer::without_fonts().rasterize(&doc).unwrap();
            assert_eq!((still.width(), still.height()), style.pixel_size(10, 2));
        }
    }
}
