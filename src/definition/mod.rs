// src/definition/mod.rs

//! Package definition files
//!
//! A definition is a TOML document describing one package:
//!
//! ```toml
//! [package]
//! name = "foo"
//! version = "1.0"
//! architecture = "x86_64"
//! requires = ["bar>=1.0"]
//! setupScript = "systemctl daemon-reload"
//!
//! [[file]]
//! path = "/etc/foo.conf"
//! content = "key = value\n"
//!
//! [[symlink]]
//! path = "/usr/bin/foo"
//! target = "../lib/foo/foo"
//! ```
//!
//! Loading turns it into a [`Package`] with a fully populated payload tree.

use crate::error::{Error, Result};
use crate::filesystem::{
    path, Directory, NodeMetadata, RegularFile, Symlink, DEFAULT_DIRECTORY_MODE, DEFAULT_FILE_MODE,
};
use crate::package::{Action, Architecture, Package, Relationship};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the timestamp used for every payload entry
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Root structure of a definition file
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDefinition {
    pub package: PackageSection,

    #[serde(default, rename = "directory")]
    pub directories: Vec<DirectoryEntry>,

    #[serde(default, rename = "file")]
    pub files: Vec<FileEntry>,

    #[serde(default, rename = "symlink")]
    pub symlinks: Vec<SymlinkEntry>,
}

/// The `[package]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    #[serde(default = "default_release")]
    pub release: u32,
    #[serde(default)]
    pub epoch: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub replaces: Vec<String>,
    #[serde(default)]
    pub setup_script: Option<String>,
    #[serde(default)]
    pub cleanup_script: Option<String>,
}

fn default_release() -> u32 {
    1
}

/// A `[[directory]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub mode: Option<u32>,
    pub owner: Option<u32>,
    pub group: Option<u32>,
}

/// A `[[file]]` entry; exactly one of `content` and `contentFrom` is required
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub path: String,
    pub content: Option<String>,
    /// Path of a file to copy, relative to the definition file
    pub content_from: Option<PathBuf>,
    pub mode: Option<u32>,
    pub owner: Option<u32>,
    pub group: Option<u32>,
}

/// A `[[symlink]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct SymlinkEntry {
    pub path: String,
    pub target: String,
    pub owner: Option<u32>,
    pub group: Option<u32>,
}

impl PackageDefinition {
    /// Load a definition from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Definition(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse a definition from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let definition: PackageDefinition = toml::from_str(content)?;

        if definition.package.name.is_empty() {
            return Err(Error::Definition("missing package.name".to_string()));
        }
        if definition.package.version.is_empty() {
            return Err(Error::Definition("missing package.version".to_string()));
        }
        Ok(definition)
    }

    /// Build the package described by this definition
    ///
    /// `base_dir` resolves `contentFrom` paths; `mtime` is applied to every
    /// payload entry.
    pub fn into_package(self, base_dir: &Path, mtime: u64) -> Result<Package> {
        let section = self.package;
        let mut pkg = Package::new(section.name, section.version);
        pkg.release = section.release;
        pkg.epoch = section.epoch;
        pkg.description = section.description;
        pkg.author = section.author;
        if let Some(arch) = section.architecture {
            pkg.architecture = arch.parse::<Architecture>()?;
        }

        pkg.requires = parse_relations(&section.requires)?;
        pkg.provides = parse_relations(&section.provides)?;
        pkg.conflicts = parse_relations(&section.conflicts)?;
        pkg.replaces = parse_relations(&section.replaces)?;

        for (action, script) in [
            (Action::Setup, section.setup_script),
            (Action::Cleanup, section.cleanup_script),
        ] {
            if let Some(script) = script {
                pkg.scripts.insert(action, script);
            }
        }

        let defaults = NodeMetadata {
            mtime,
            ..NodeMetadata::with_mode(DEFAULT_DIRECTORY_MODE)
        };
        pkg.fs_root = Directory::with_metadata(defaults);
        let mut seen = HashSet::new();

        for entry in self.directories {
            claim_path(&mut seen, &entry.path)?;
            let metadata = metadata_for(entry.mode, DEFAULT_DIRECTORY_MODE, entry.owner, entry.group, mtime)?;
            pkg.fs_root.mkdir_p(&entry.path, metadata, defaults)?;
        }

        for entry in self.files {
            claim_path(&mut seen, &entry.path)?;
            let content = match (entry.content, entry.content_from) {
                (Some(content), None) => content.into_bytes(),
                (None, Some(source)) => {
                    let source = base_dir.join(source);
                    fs::read(&source).map_err(|e| {
                        Error::Definition(format!("cannot read {}: {}", source.display(), e))
                    })?
                }
                (Some(_), Some(_)) => {
                    return Err(Error::Definition(format!(
                        "file {} has both content and contentFrom",
                        entry.path
                    )));
                }
                (None, None) => {
                    return Err(Error::Definition(format!(
                        "file {} needs content or contentFrom",
                        entry.path
                    )));
                }
            };
            let metadata = metadata_for(entry.mode, DEFAULT_FILE_MODE, entry.owner, entry.group, mtime)?;
            pkg.fs_root
                .add(&entry.path, RegularFile { content, metadata }, defaults)?;
        }

        for entry in self.symlinks {
            claim_path(&mut seen, &entry.path)?;
            let metadata = metadata_for(None, 0o777, entry.owner, entry.group, mtime)?;
            pkg.fs_root.add(
                &entry.path,
                Symlink {
                    target: entry.target,
                    metadata,
                },
                defaults,
            )?;
        }

        let stats = pkg.fs_root.stats();
        debug!(
            "Loaded {}: {} directories, {} files, {} symlinks",
            pkg.name, stats.directories, stats.files, stats.symlinks
        );
        Ok(pkg)
    }
}

/// Load a definition file into a package
///
/// `contentFrom` paths are resolved relative to the file's directory and all
/// timestamps are taken from `SOURCE_DATE_EPOCH` (0 when unset).
pub fn load(path: &Path) -> Result<Package> {
    let definition = PackageDefinition::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    definition.into_package(base_dir, source_date_epoch()?)
}

/// Timestamp from `SOURCE_DATE_EPOCH`, or 0 when it is not set
pub fn source_date_epoch() -> Result<u64> {
    match std::env::var(SOURCE_DATE_EPOCH) {
        Ok(value) => value.trim().parse().map_err(|_| {
            Error::Definition(format!("{} is not a timestamp: \"{}\"", SOURCE_DATE_EPOCH, value))
        }),
        Err(_) => Ok(0),
    }
}

fn parse_relations(entries: &[String]) -> Result<Vec<Relationship>> {
    entries.iter().map(|entry| Relationship::parse(entry)).collect()
}

/// Record a payload path, failing when it was declared before
fn claim_path(seen: &mut HashSet<String>, raw: &str) -> Result<()> {
    let sanitized = path::sanitize_path(raw)?;
    if !seen.insert(sanitized) {
        return Err(Error::Definition(format!("duplicate path {}", raw)));
    }
    Ok(())
}

fn metadata_for(
    mode: Option<u32>,
    default_mode: u32,
    owner: Option<u32>,
    group: Option<u32>,
    mtime: u64,
) -> Result<NodeMetadata> {
    let mode = mode.unwrap_or(default_mode);
    if mode > 0o7777 {
        return Err(Error::Definition(format!("invalid mode {:o}", mode)));
    }
    Ok(NodeMetadata {
        mode,
        uid: owner.unwrap_or(0),
        gid: group.unwrap_or(0),
        mtime,
    })
}
