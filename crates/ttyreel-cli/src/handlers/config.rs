//! Config command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use std::path::{Path, PathBuf};
use ttyreel::config::write_default_config;

/// Execute the config command: write the default config to the current directory
pub fn execute_config(config: &CliConfig) -> CliResult<()> {
    let path = write_config_into(&std::env::current_dir()?)?;
    config
        .reporter()
        .success(&format!("The config file is created at {}", path.display()));
    Ok(())
}

/// Write the default config into `dir`
pub fn write_config_into(dir: &Path) -> CliResult<PathBuf> {
    Ok(write_default_config(dir)?)
}
