//! Ttyreel CLI: record terminal sessions and turn them into GIFs
//!
//! ## Usage
//!
//! ```bash
//! ttyreel record demo                # Record a shell session to demo.yml
//! ttyreel play demo -s 0.5           # Replay at double speed
//! ttyreel render demo -o demo.gif    # Render an animated GIF
//! ttyreel generate demo              # Write demo.html
//! ```

use clap::Parser;
use std::process::ExitCode;
use ttyreel_cli::{handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init_tracing(config.verbosity, config.color.should_color());

    match cli.command {
        Commands::Record(args) => handlers::execute_record(&config, &args),
        Commands::Play(args) => handlers::execute_play(&config, &args),
        Commands::Render(args) => handlers::execute_render(&config, &args),
        Commands::Generate(args) => handlers::execute_generate(&config, &args),
        Commands::Init => handlers::execute_init(&config),
        Commands::Config => handlers::execute_config(&config),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}
