//! Command handlers - one module per subcommand
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests for the helpers

pub mod config;
pub mod generate;
pub mod init;
pub mod play;
pub mod record;
pub mod render;

pub use config::execute_config;
pub use generate::{default_player_path, execute_generate};
pub use init::execute_init;
pub use play::{execute_play, playback_options};
pub use record::{execute_record, record_document};
pub use render::{default_gif_name, execute_render, gif_options};

use crate::error::{CliError, CliResult};

/// Single-threaded runtime for one command
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create runtime: {e}")))
}
