//! Play command handler

use super::runtime;
use crate::commands::PlayArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use std::io::Write;
use ttyreel::prelude::*;

/// Full terminal reset (RIS)
pub const TERMINAL_RESET: &[u8] = b"\x1bc";

/// Playback options for `play`: recorded delays with `--real-timing`,
/// otherwise the config's `frameDelay` and `maxIdleTime`
pub fn playback_options(
    config: &RecordingConfig,
    real_timing: bool,
    speed_factor: f64,
) -> CliResult<PlaybackOptions> {
    if !speed_factor.is_finite() || speed_factor <= 0.0 {
        return Err(CliError::invalid_argument(format!(
            "speed factor must be a positive number, got {speed_factor}"
        )));
    }
    Ok(if real_timing {
        PlaybackOptions::real_timing(speed_factor)
    } else {
        config.playback_options().with_speed_factor(speed_factor)
    })
}

/// Execute the play command
pub fn execute_play(_config: &CliConfig, args: &PlayArgs) -> CliResult<()> {
    let recording = RecordingFile::load(&args.file)?;
    let options = playback_options(&recording.config, args.real_timing, args.speed_factor)?;
    let frames = normalize(&recording.records, &options);

    let rt = runtime()?;
    let scheduler = PlaybackScheduler::new();
    let token = scheduler.cancel_token();
    let mut sink = WriterSink::new(std::io::stdout());

    let outcome = rt.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
        scheduler.play(&frames, &mut sink).await
    })?;

    let mut stdout = sink.into_inner();
    stdout.write_all(TERMINAL_RESET)?;
    stdout.flush()?;

    if let PlaybackOutcome::Cancelled { emitted } = outcome {
        tracing::info!(emitted, total = frames.len(), "playback interrupted");
    }
    Ok(())
}
