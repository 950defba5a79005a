//! Record command handler

use super::runtime;
use crate::commands::RecordArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use std::sync::Arc;
use ttyreel::prelude::*;
use ttyreel::{host_terminal_size, NativePtySpawner, PtySpec, RawModeGuard, Recorder, SystemClock};

/// Resolve and normalize the config document a recording is made with
pub fn record_document(
    args: &RecordArgs,
    host_size: Option<(u16, u16)>,
) -> CliResult<ConfigDocument> {
    let mut document = ConfigDocument::resolve(args.config.as_deref())?;
    if let Some(command) = &args.command {
        document.set_value("command", command)?;
    }
    document.normalize_for_recording(host_size)?;
    Ok(document)
}

/// Execute the record command
pub fn execute_record(config: &CliConfig, args: &RecordArgs) -> CliResult<()> {
    let document = record_document(args, host_terminal_size())?;
    let spec = PtySpec::from_config(document.config())?;
    let reporter = config.reporter();

    reporter.info("The recording session has started");
    reporter.info("Press CTRL+D to exit and save the recording");

    let recorder = Recorder::new(Arc::new(NativePtySpawner), SystemClock::shared());
    let rt = runtime()?;
    let frames = {
        let _raw = RawModeGuard::enable()?;
        rt.block_on(recorder.record(
            &spec,
            std::io::stdout(),
            Some(Box::new(std::io::stdin())),
        ))
    }
    .map_err(|e| match e {
        ReelError::EmptyRecording => CliError::recording("the session produced no output"),
        other => other.into(),
    })?;

    let path = RecordingFile::save(&args.file, &document, &frames)?;
    reporter.success(&format!("Recording saved to {}", path.display()));
    Ok(())
}
