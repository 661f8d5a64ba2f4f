//! xcprobe CLI - Diagnose watchOS/iOS build configuration problems

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use xcprobe::util::Shell;

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("xcprobe=debug")
    } else if cli.quiet {
        EnvFilter::new("xcprobe=error")
    } else {
        EnvFilter::new("xcprobe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions {
        shell: Shell::from_flags(
            cli.quiet,
            cli.verbose,
            cli.color,
            cli.message_format == MessageFormat::Json,
        ),
    };

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, &global_opts),
        Commands::Targets(args) => commands::targets::execute(args, &global_opts),
        Commands::Scan(args) => commands::scan::execute(args, &global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
