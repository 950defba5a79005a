//! Self-contained HTML player.
//!
//! Every frame is replayed through a [`TerminalSurface`] and its visible grid
//! is written out as colored spans. A small inline script shows the frames in
//! order on timers and loops.

use crate::config::RecordingConfig;
use crate::frame::FrameSequence;
use crate::render::palette::css;
use crate::render::raster::{escape_xml, Rasterizer};
use crate::render::terminal::{GridSnapshot, StyledRun, SurfaceStyle, TerminalSurface};
use crate::result::{ReelError, ReelResult};
use std::fmt::Write as FmtWrite;
use std::path::Path;
use tracing::info;

/// Builds the HTML document for one recording
#[derive(Debug, Clone)]
pub struct WebPlayer {
    title: String,
    columns: u16,
    lines: u16,
    style: SurfaceStyle,
}

impl WebPlayer {
    /// Player sized and styled from a recording config
    pub fn new(config: &RecordingConfig, title: impl Into<String>) -> ReelResult<Self> {
        let (columns, lines) = config.size();
        Ok(Self {
            title: title.into(),
            columns,
            lines,
            style: SurfaceStyle::from_config(config)?,
        })
    }

    /// Write the document for `frames` (already normalized) to `output_path`
    pub fn generate_html(&self, frames: &FrameSequence, output_path: &Path) -> ReelResult<()> {
        let html = self.render_html(frames)?;
        std::fs::write(output_path, html)?;
        info!(path = %output_path.display(), frames = frames.len(), "wrote web player");
        Ok(())
    }

    /// Render the document for `frames`; delays are used as given
    pub fn render_html(&self, frames: &FrameSequence) -> ReelResult<String> {
        if frames.is_empty() {
            return Err(ReelError::EmptyRecording);
        }

        let mut surface = TerminalSurface::new(
            self.columns,
            self.lines,
            self.style.clone(),
            Rasterizer::without_fonts(),
        );
        let mut screens = String::new();
        for (index, frame) in frames.iter().enumerate() {
            surface.feed(&frame.content);
            self.frame_markup(&mut screens, index, &surface.snapshot())
                .map_err(fmt_error)?;
        }

        let (width, height) = self.style.pixel_size(usize::from(self.columns), usize::from(self.lines));
        let (_, cell_h) = self.style.cell_size();
        let delays = serde_json::to_string(&frames.delays())?;
        let palette = &self.style.palette;

        let mut html = String::with_capacity(screens.len() + 4096);
        write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ margin: 0; padding: 20px; background: #2b2b2b; }}
        #ttyreel {{ position: relative; width: {width}px; height: {height}px; box-sizing: border-box; padding: {pad}px; overflow: hidden; background: {bg}; color: {fg}; font-family: {font}; font-size: {size}px; line-height: {cell_h:.2}px; white-space: pre; }}
        #ttyreel .frame[hidden] {{ display: none; }}
        #ttyreel .line {{ height: {cell_h:.2}px; }}
        #ttyreel .cursor {{ position: absolute; background: {cursor}; }}
        #ttyreel-toggle {{ margin-top: 10px; }}
    </style>
</head>
<body>
<div id="ttyreel">
{screens}</div>
<button id="ttyreel-toggle" type="button">Pause</button>
<script>
(function () {{
    var frames = document.querySelectorAll('#ttyreel .frame');
    var delays = {delays};
    var button = document.getElementById('ttyreel-toggle');
    var index = 0;
    var timer = null;
    function show(next) {{
        frames[index].hidden = true;
        index = next;
        frames[index].hidden = false;
    }}
    function schedule() {{
        var next = (index + 1) % frames.length;
        timer = setTimeout(function () {{
            show(next);
            schedule();
        }}, delays[next]);
    }}
    button.addEventListener('click', function () {{
        if (timer === null) {{
            schedule();
            button.textContent = 'Pause';
        }} else {{
            clearTimeout(timer);
            timer = null;
            button.textContent = 'Play';
        }}
    }});
    frames[0].hidden = false;
    if (frames.length > 1) {{
        schedule();
    }}
}})();
</script>
</body>
</html>
"#,
            title = escape_xml(&self.title),
            pad = self.style.padding,
            bg = css(palette.background),
            fg = css(palette.foreground),
            cursor = css(palette.cursor),
            font = escape_xml(&self.style.font_family),
            size = self.style.font_size,
        )
        .map_err(fmt_error)?;
        Ok(html)
    }

    fn frame_markup(&self, out: &mut String, index: usize, snapshot: &GridSnapshot) -> std::fmt::Result {
        writeln!(out, "<div class=\"frame\" data-index=\"{index}\" hidden>")?;
        for runs in &snapshot.lines {
            out.push_str("<div class=\"line\">");
            let visible = runs.iter().rposition(|r| !r.is_blank()).map_or(0, |last| last + 1);
            for run in &runs[..visible] {
                span(out, run, &self.style)?;
            }
            out.push_str("</div>\n");
        }
        if let Some(cursor) = snapshot.cursor {
            let (cell_w, cell_h) = self.style.cell_size();
            let pad = self.style.padding as f32;
            let (w, h, dy) = cursor_box(&self.style, cell_w, cell_h);
            writeln!(
                out,
                "<div class=\"cursor\" style=\"left:{:.2}px;top:{:.2}px;width:{w:.2}px;height:{h:.2}px\"></div>",
                (cursor.column as f32).mul_add(cell_w, pad),
                (cursor.line as f32).mul_add(cell_h, pad) + dy,
            )?;
        }
        out.push_str("</div>\n");
        Ok(())
    }
}

fn cursor_box(style: &SurfaceStyle, cell_w: f32, cell_h: f32) -> (f32, f32, f32) {
    use crate::config::CursorStyle;
    match style.cursor_style {
        CursorStyle::Block => (cell_w, cell_h, 0.0),
        CursorStyle::Underline => (cell_w, 2.0, cell_h - 2.0),
        CursorStyle::Bar => (2.0, cell_h, 0.0),
    }
}

fn span(out: &mut String, run: &StyledRun, style: &SurfaceStyle) -> std::fmt::Result {
    let mut css_text = String::new();
    if run.fg != style.palette.foreground {
        write!(css_text, "color:{};", css(run.fg))?;
    }
    if let Some(bg) = run.bg {
        write!(css_text, "background:{};", css(bg))?;
    }
    if run.bold {
        css_text.push_str("font-weight:bold;");
    }
    if run.italic {
        css_text.push_str("font-style:italic;");
    }
    match (run.underline, run.strikeout) {
        (true, true) => css_text.push_str("text-decoration:underline line-through;"),
        (true, false) => css_text.push_str("text-decoration:underline;"),
        (false, true) => css_text.push_str("text-decoration:line-through;"),
        (false, false) => {}
    }

    let text = escape_xml(&run.text);
    if css_text.is_empty() {
        out.push_str(&text);
        Ok(())
    } else {
        write!(out, "<span style=\"{css_text}\">{text}</span>")
    }
}

fn fmt_error(e: std::fmt::Error) -> ReelError {
    ReelError::invalid_state(e.to_string())
}
