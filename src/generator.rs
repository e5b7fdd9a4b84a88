// src/generator.rs

//! Common interface for package format generators

use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use crate::package::Package;
use crate::pacman::PacmanGenerator;

/// Formats that [`generator_for`] can produce
pub const SUPPORTED_FORMATS: &[&str] = &["pacman"];

/// Turns a [`Package`] into an archive of one specific package format
pub trait Generator {
    /// Name of the produced format, e.g. "pacman"
    fn format_name(&self) -> &'static str;

    /// Change the compression of the produced archive
    fn set_compression(&mut self, compression: CompressionFormat);

    /// File name under which the archive should be stored
    ///
    /// Only meaningful for a package that passed [`Generator::validate`].
    fn recommended_file_name(&self) -> String;

    /// Check the package against the format's rules
    ///
    /// Returns all violations at once; an empty list means [`Generator::build`]
    /// can proceed.
    fn validate(&self) -> Vec<Error>;

    /// Generate the control members and return the complete archive
    fn build(&mut self) -> Result<Vec<u8>>;
}

/// Look up the generator for a format name
pub fn generator_for(format_name: &str, package: Package) -> Result<Box<dyn Generator>> {
    match format_name {
        "pacman" | "arch" => Ok(Box::new(PacmanGenerator::new(package))),
        other => Err(Error::UnsupportedFormat(format!(
            "{} (supported: {})",
            other,
            SUPPORTED_FORMATS.join(", ")
        ))),
    }
}
