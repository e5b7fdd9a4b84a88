// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `build --stdout` can be piped
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            definition,
            output_dir,
            stdout,
            compression,
            format,
        } => commands::cmd_build(&definition, &output_dir, stdout, compression, &format),
        Commands::Validate { definition, format } => commands::cmd_validate(&definition, &format),
        Commands::Filename {
            definition,
            compression,
            format,
        } => commands::cmd_filename(&definition, compression, &format),
    }
}
