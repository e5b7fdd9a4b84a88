// src/commands.rs
//! Command implementations for the pacbuild binary

use anyhow::{bail, Context, Result};
use pacbuild::{definition, generator_for, CompressionFormat, Generator};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Load a definition and wrap it in the generator for `format`
fn load_generator(
    definition_path: &Path,
    format: &str,
    compression: CompressionFormat,
) -> Result<Box<dyn Generator>> {
    let package = definition::load(definition_path)
        .with_context(|| format!("Failed to load {}", definition_path.display()))?;
    let mut generator = generator_for(format, package)?;
    generator.set_compression(compression);
    Ok(generator)
}

/// Print every validation error and fail when there is at least one
fn ensure_valid(generator: &dyn Generator) -> Result<()> {
    let errors = generator.validate();
    if errors.is_empty() {
        return Ok(());
    }

    for error in &errors {
        eprintln!("error: {}", error);
    }
    bail!(
        "{} package is invalid ({} errors)",
        generator.format_name(),
        errors.len()
    )
}

pub fn cmd_build(
    definition_path: &Path,
    output_dir: &Path,
    to_stdout: bool,
    compression: CompressionFormat,
    format: &str,
) -> Result<()> {
    let mut generator = load_generator(definition_path, format, compression)?;
    ensure_valid(generator.as_ref())?;

    let file_name = generator.recommended_file_name();
    let data = generator
        .build()
        .with_context(|| format!("Failed to build {}", file_name))?;

    if to_stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&data)?;
        stdout.flush()?;
        info!("Wrote {} ({} bytes) to stdout", file_name, data.len());
        return Ok(());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    // Only a complete package ever appears under the final name
    let mut temp = NamedTempFile::new_in(output_dir)?;
    temp.write_all(&data)?;
    temp.as_file().sync_all()?;
    let target = output_dir.join(&file_name);
    temp.persist(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    info!("Wrote {} ({} bytes)", target.display(), data.len());
    println!("{}", file_name);
    Ok(())
}

pub fn cmd_validate(definition_path: &Path, format: &str) -> Result<()> {
    let generator = load_generator(definition_path, format, CompressionFormat::default())?;
    ensure_valid(generator.as_ref())?;
    println!("{}: OK", definition_path.display());
    Ok(())
}

pub fn cmd_filename(definition_path: &Path, compression: CompressionFormat, format: &str) -> Result<()> {
    let generator = load_generator(definition_path, format, compression)?;
    ensure_valid(generator.as_ref())?;
    println!("{}", generator.recommended_file_name());
    Ok(())
}
