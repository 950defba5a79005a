//! Render command handler

use super::runtime;
use crate::commands::RenderArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use std::path::PathBuf;
use ttyreel::prelude::*;
use ttyreel::{FrameStore, GifAssembler, GifOptions, TerminalSurface};

/// `render<unix millis>.gif`
#[must_use]
pub fn default_gif_name(unix_millis: i64) -> PathBuf {
    PathBuf::from(format!("render{unix_millis}.gif"))
}

/// GIF options from the config, with the command line quality winning
#[must_use]
pub fn gif_options(config: &RecordingConfig, quality: Option<u8>) -> GifOptions {
    let options = GifOptions::from_config(config);
    match quality {
        Some(quality) => options.with_quality(quality),
        None => options,
    }
}

/// Execute the render command
pub fn execute_render(config: &CliConfig, args: &RenderArgs) -> CliResult<()> {
    if args.step == 0 {
        return Err(CliError::invalid_argument("step must be at least 1"));
    }

    let recording = RecordingFile::load(&args.file)?;
    let frames = normalize(&recording.records, &recording.config.playback_options());
    if frames.is_empty() {
        return Err(ReelError::EmptyRecording.into());
    }
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_gif_name(chrono::Utc::now().timestamp_millis()));

    let mut reporter = config.reporter();
    let mut surface = TerminalSurface::from_config(&recording.config)?;
    let mut store = FrameStore::new()?;
    let renderer = FrameRenderer::new(args.step)?;

    reporter.start_progress(frames.len() as u64, "Rendering");
    let summary = runtime()?.block_on(renderer.render(&frames, &mut surface, &mut store, &mut reporter))?;
    tracing::debug!(dir = %store.dir().display(), captured = summary.captured, "stills stored");

    reporter.start_progress(store.len() as u64, "Merging");
    let gif = GifAssembler::new(gif_options(&recording.config, args.quality))
        .assemble(store.stills(), store.len(), &mut reporter)
        .map_err(|e| CliError::render(e.to_string()))?;
    reporter.finish();

    std::fs::write(&output, &gif.bytes)?;
    reporter.success(&format!(
        "Rendered {} frames ({}x{}) to {}",
        gif.frames,
        gif.width,
        gif.height,
        output.display()
    ));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        assert_eq!(default_gif_name(1_700_000_000_123), PathBuf::from("render1700000000123.gif"));
    }

    #[test]
    fn test_quality_override() {
        let config = RecordingConfig {
            quality: 40,
            repeat: -1,
            ..RecordingConfig::default()
        };
        assert_eq!(gif_options(&config, None).quality, 40);
        let options = gif_options(&config, Some(90));
        assert_eq!(options.quality, 90);
        assert_eq!(options.repeat, -1);
    }
}
