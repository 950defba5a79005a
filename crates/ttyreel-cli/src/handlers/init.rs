//! Init command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use ttyreel::config::{global_directory, write_default_config};

/// Execute the init command
pub fn execute_init(config: &CliConfig) -> CliResult<()> {
    let dir = global_directory()?;
    let path = write_default_config(&dir)?;
    tracing::info!(path = %path.display(), "wrote global config");
    config
        .reporter()
        .success(&format!("The global config directory is created at {}", dir.display()));
    Ok(())
}
