//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Ttyreel: record your terminal, replay it, render it as a GIF
#[derive(Parser, Debug)]
#[command(name = "ttyreel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a terminal session and save it as a recording file
    Record(RecordArgs),

    /// Play a recording file in this terminal
    Play(PlayArgs),

    /// Render a recording file as an animated GIF
    Render(RenderArgs),

    /// Generate a self-contained HTML player for a recording file
    Generate(GenerateArgs),

    /// Create the global config directory with the default config
    Init,

    /// Write the default config to ./config.yml
    Config,
}

/// Arguments for the record command
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Recording file name (`.yml` is appended when missing)
    pub file: PathBuf,

    /// Config file to record with
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command to record, overriding the config
    #[arg(short = 'd', long)]
    pub command: Option<String>,
}

/// Arguments for the play command
#[derive(Parser, Debug)]
pub struct PlayArgs {
    /// Recording file
    pub file: PathBuf,

    /// Use the recorded delays as they are
    #[arg(short, long)]
    pub real_timing: bool,

    /// Playback speed multiplier; 2 plays at half speed
    #[arg(short, long, default_value = "1.0")]
    pub speed_factor: f64,
}

/// Arguments for the render command
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Recording file
    pub file: PathBuf,

    /// Output GIF path (default: render<unix millis>.gif)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encoding quality, 1 (fastest) to 100 (best)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Capture every n-th frame
    #[arg(short, long, default_value = "1")]
    pub step: usize,
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Recording file
    pub file: PathBuf,

    /// Output HTML path (default: <file stem>.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    mod parse_tests {
        use super::*;
        use clap::CommandFactory;

        #[test]
        fn test_command_definition_is_consistent() {
            Cli::command().debug_assert();
        }

        #[test]
        fn test_record_args() {
            let cli = Cli::try_parse_from(["ttyreel", "record", "demo", "-d", "ls -la", "-c", "my.yml"]).unwrap();
            match cli.command {
                Commands::Record(args) => {
                    assert_eq!(args.file, PathBuf::from("demo"));
                    assert_eq!(args.command.as_deref(), Some("ls -la"));
                    assert_eq!(args.config, Some(PathBuf::from("my.yml")));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_play_args() {
            let cli = Cli::try_parse_from(["ttyreel", "play", "demo.yml", "-r", "-s", "2"]).unwrap();
            match cli.command {
                Commands::Play(args) => {
                    assert!(args.real_timing);
                    assert_eq!(args.speed_factor, 2.0);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_render_defaults() {
            let cli = Cli::try_parse_from(["ttyreel", "render", "demo"]).unwrap();
            match cli.command {
                Commands::Render(args) => {
                    assert_eq!(args.step, 1);
                    assert_eq!(args.quality, None);
                    assert_eq!(args.output, None);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_render_quality_range() {
            assert!(Cli::try_parse_from(["ttyreel", "render", "demo", "-q", "0"]).is_err());
            assert!(Cli::try_parse_from(["ttyreel", "render", "demo", "-q", "101"]).is_err());
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::try_parse_from(["ttyreel", "init", "-vv", "--color", "never"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert_eq!(ColorChoice::from(cli.color), ColorChoice::Never);
        }
    }
}
