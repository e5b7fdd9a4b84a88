// src/error.rs

//! Error types shared across pacbuild

use crate::compression::CompressionError;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A name or version does not match the target format's grammar
    #[error("{subject} \"{value}\" is not acceptable for {format} packages{location}")]
    Grammar {
        subject: &'static str,
        value: String,
        format: &'static str,
        /// Extra context such as " (found in requires)"; empty for top-level fields
        location: String,
    },

    /// An enum value has no rendering in the target format
    #[error("{kind} \"{value}\" is not supported by {format} packages")]
    MissingMapping {
        kind: &'static str,
        value: String,
        format: &'static str,
    },

    /// Generating one of the control members failed
    #[error("Failed to write {member}: {source}")]
    Member {
        member: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// The package definition file is malformed
    #[error("Invalid package definition: {0}")]
    Definition(String),

    #[error("Unsupported package format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Wrap an error with the name of the control member being produced
    pub fn in_member(member: &'static str, source: Error) -> Self {
        Self::Member {
            member,
            source: Box::new(source),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Definition(e.to_string())
    }
}
