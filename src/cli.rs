// src/cli.rs
//! CLI definitions for pacbuild
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use pacbuild::CompressionFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pacbuild")]
#[command(version)]
#[command(about = "Build pacman packages from declarative package definitions", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a definition and build the package
    Build {
        /// Path to the package definition (TOML)
        definition: PathBuf,

        /// Directory to write the package to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Write the package to stdout instead of a file
        #[arg(long, conflicts_with = "output_dir")]
        stdout: bool,

        /// Payload compression (xz, zstd, gzip)
        #[arg(short, long, default_value = "xz")]
        compression: CompressionFormat,

        /// Package format to generate
        #[arg(short, long, default_value = "pacman")]
        format: String,
    },

    /// Check a definition and report every problem found
    Validate {
        /// Path to the package definition (TOML)
        definition: PathBuf,

        /// Package format to validate against
        #[arg(short, long, default_value = "pacman")]
        format: String,
    },

    /// Print the file name the package would be written to
    Filename {
        /// Path to the package definition (TOML)
        definition: PathBuf,

        /// Payload compression (xz, zstd, gzip)
        #[arg(short, long, default_value = "xz")]
        compression: CompressionFormat,

        /// Package format to generate
        #[arg(short, long, default_value = "pacman")]
        format: String,
    },
}
