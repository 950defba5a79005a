//! Generate command handler

use crate::commands::GenerateArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use std::path::{Path, PathBuf};
use ttyreel::config::resolve_file_path;
use ttyreel::prelude::*;
use ttyreel::WebPlayer;

/// `<recording stem>.html` next to the recording
pub fn default_player_path(recording: &Path) -> CliResult<PathBuf> {
    Ok(resolve_file_path(recording, "yml")?.with_extension("html"))
}

/// Execute the generate command
pub fn execute_generate(config: &CliConfig, args: &GenerateArgs) -> CliResult<()> {
    let recording = RecordingFile::load(&args.file)?;
    let frames = normalize(&recording.records, &recording.config.playback_options());
    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_player_path(&args.file)?,
    };
    let title = args
        .file
        .file_stem()
        .map_or_else(|| "ttyreel".to_string(), |stem| stem.to_string_lossy().into_owned());

    WebPlayer::new(&recording.config, title)?.generate_html(&frames, &output)?;
    config
        .reporter()
        .success(&format!("Web player written to {}", output.display()));
    Ok(())
}
