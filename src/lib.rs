// src/lib.rs

//! pacbuild
//!
//! Builds pacman packages (`.pkg.tar.xz`, as used by Arch Linux and
//! derivatives) from a format-agnostic package description.
//!
//! # Architecture
//!
//! - `package`: the package model (identity, relationships, scripts, payload)
//! - `filesystem`: the in-memory payload tree and its tar serialization
//! - `pacman`: `.PKGINFO`, `.INSTALL` and `.MTREE` generation plus the
//!   [`PacmanGenerator`] that assembles the final archive
//! - `definition`: TOML package definitions for the command-line tool
//!
//! ```
//! use pacbuild::{Generator, Package, PacmanGenerator};
//!
//! let package = Package::new("foo", "1.0");
//! let mut generator = PacmanGenerator::new(package);
//! assert!(generator.validate().is_empty());
//! assert_eq!(generator.recommended_file_name(), "foo-1.0-1-any.pkg.tar.xz");
//! let archive = generator.build().unwrap();
//! assert!(!archive.is_empty());
//! ```

pub mod compression;
pub mod definition;
mod error;
pub mod filesystem;
pub mod generator;
pub mod hash;
pub mod package;
pub mod pacman;

pub use compression::{CompressionError, CompressionFormat};
pub use error::{Error, Result};
pub use filesystem::{Directory, Node, NodeMetadata, RegularFile, Symlink};
pub use generator::{generator_for, Generator};
pub use hash::{HashAlgorithm, Hasher};
pub use package::{Action, Architecture, Package, RegexSet, Relationship, VersionConstraint};
pub use pacman::{full_version_string, PacmanGenerator};
