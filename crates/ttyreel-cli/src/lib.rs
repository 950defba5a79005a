//! Ttyreel CLI Library
//!
//! Command-line interface for recording, playing and rendering terminal
//! sessions.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, GenerateArgs, PlayArgs, RecordArgs, RenderArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
