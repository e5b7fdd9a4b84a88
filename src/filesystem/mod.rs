// src/filesystem/mod.rs

//! In-memory payload tree for package builds
//!
//! A package's payload is an owned tree of [`Node`]s rooted at a
//! [`Directory`]. Entries are kept in a `BTreeMap`, so every traversal visits
//! them in sorted order and the resulting archives are reproducible.
//!
//! Paths handed to this module are archive-relative (`usr/bin/foo`); a
//! leading slash is accepted and stripped.

pub mod archive;
pub mod path;

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Default permission bits for regular files
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Default permission bits for directories
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o755;

/// Nominal on-disk size attributed to each directory in size accounting
pub const DIRECTORY_SIZE: u64 = 4096;

/// Ownership, permissions and timestamp of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMetadata {
    /// Permission bits (no file type bits)
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Modification time in seconds since the Unix epoch
    pub mtime: u64,
}

impl NodeMetadata {
    /// Metadata owned by root with the given mode and a zero timestamp
    pub const fn with_mode(mode: u32) -> Self {
        Self {
            mode,
            uid: 0,
            gid: 0,
            mtime: 0,
        }
    }
}

/// A regular file with its full content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularFile {
    pub content: Vec<u8>,
    pub metadata: NodeMetadata,
}

impl RegularFile {
    pub fn new(content: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            content: content.into(),
            metadata: NodeMetadata::with_mode(mode),
        }
    }
}

/// A symbolic link; never followed by any traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    pub target: String,
    /// Symlink permissions are always 0777; only ownership and mtime apply
    pub metadata: NodeMetadata,
}

impl Symlink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            metadata: NodeMetadata::with_mode(0o777),
        }
    }
}

/// A directory and its entries, keyed by entry name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub entries: BTreeMap<String, Node>,
    pub metadata: NodeMetadata,
}

impl Default for Directory {
    fn default() -> Self {
        Self::with_metadata(NodeMetadata::with_mode(DEFAULT_DIRECTORY_MODE))
    }
}

/// One entry of the payload tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Directory),
    RegularFile(RegularFile),
    Symlink(Symlink),
}

impl Node {
    /// Short human-readable name of the node type
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Directory(_) => "directory",
            Node::RegularFile(_) => "regular file",
            Node::Symlink(_) => "symlink",
        }
    }

    pub fn metadata(&self) -> &NodeMetadata {
        match self {
            Node::Directory(d) => &d.metadata,
            Node::RegularFile(f) => &f.metadata,
            Node::Symlink(s) => &s.metadata,
        }
    }

    /// Bytes this node occupies once installed
    ///
    /// Regular files count their content, symlinks the length of their
    /// target, and directories a nominal [`DIRECTORY_SIZE`] plus their
    /// entries.
    pub fn installed_size_in_bytes(&self) -> u64 {
        match self {
            Node::Directory(d) => DIRECTORY_SIZE + d.installed_size_in_bytes(),
            Node::RegularFile(f) => f.content.len() as u64,
            Node::Symlink(s) => s.target.len() as u64,
        }
    }
}

impl From<Directory> for Node {
    fn from(d: Directory) -> Self {
        Node::Directory(d)
    }
}

impl From<RegularFile> for Node {
    fn from(f: RegularFile) -> Self {
        Node::RegularFile(f)
    }
}

impl From<Symlink> for Node {
    fn from(s: Symlink) -> Self {
        Node::Symlink(s)
    }
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: NodeMetadata) -> Self {
        Self {
            entries: BTreeMap::new(),
            metadata,
        }
    }

    /// Sum of the installed sizes of all entries (the directory itself excluded)
    pub fn installed_size_in_bytes(&self) -> u64 {
        self.entries.values().map(Node::installed_size_in_bytes).sum()
    }

    /// Insert a node directly below this directory, replacing any existing entry
    pub fn insert_entry(&mut self, name: &str, node: impl Into<Node>) -> Result<Option<Node>> {
        let name = path::sanitize_filename(name)?;
        Ok(self.entries.insert(name.to_string(), node.into()))
    }

    /// Remove the entry with the given name directly below this directory
    pub fn remove_entry(&mut self, name: &str) -> Option<Node> {
        self.entries.remove(name)
    }

    /// Look up a node by relative path
    pub fn get(&self, path: &str) -> Option<&Node> {
        let parts = path::components(path).ok()?;
        let (last, parents) = parts.split_last()?;

        let mut dir = self;
        for part in parents {
            match dir.entries.get(*part)? {
                Node::Directory(d) => dir = d,
                _ => return None,
            }
        }
        dir.entries.get(*last)
    }

    /// Create a directory and all missing parents
    ///
    /// Missing parents receive `parent_metadata`. When the final directory
    /// already exists its metadata is replaced by `metadata`.
    pub fn mkdir_p(
        &mut self,
        path: &str,
        metadata: NodeMetadata,
        parent_metadata: NodeMetadata,
    ) -> Result<()> {
        let parts = path::components(path)?;
        let (last, parents) = parts.split_last().ok_or_else(|| {
            Error::InvalidPath(format!("\"{}\" is empty after sanitization", path))
        })?;

        let dir = self.parent_dir_mut(path, parents, parent_metadata)?;
        match dir
            .entries
            .entry((*last).to_string())
            .or_insert_with(|| Node::Directory(Directory::with_metadata(metadata)))
        {
            Node::Directory(d) => {
                d.metadata = metadata;
                Ok(())
            }
            other => Err(Error::InvalidPath(format!(
                "{} exists but is a {}, not a directory",
                path,
                other.kind_name()
            ))),
        }
    }

    /// Insert a node at a relative path, creating missing parent directories
    ///
    /// Fails when the path already exists; payload paths are unique.
    pub fn add(
        &mut self,
        path: &str,
        node: impl Into<Node>,
        parent_metadata: NodeMetadata,
    ) -> Result<()> {
        let parts = path::components(path)?;
        let (last, parents) = parts.split_last().ok_or_else(|| {
            Error::InvalidPath(format!("\"{}\" is empty after sanitization", path))
        })?;

        let dir = self.parent_dir_mut(path, parents, parent_metadata)?;
        if dir.entries.contains_key(*last) {
            return Err(Error::InvalidPath(format!(
                "path already exists: {}",
                path
            )));
        }
        dir.entries.insert((*last).to_string(), node.into());
        Ok(())
    }

    /// Walk down to the directory holding an entry, creating it as needed
    fn parent_dir_mut(
        &mut self,
        full_path: &str,
        parents: &[&str],
        parent_metadata: NodeMetadata,
    ) -> Result<&mut Directory> {
        let mut dir = self;
        for part in parents {
            let node = dir
                .entries
                .entry((*part).to_string())
                .or_insert_with(|| Node::Directory(Directory::with_metadata(parent_metadata)));
            dir = match node {
                Node::Directory(d) => d,
                other => {
                    return Err(Error::InvalidPath(format!(
                        "parent of {} is a {}, not a directory",
                        full_path,
                        other.kind_name()
                    )));
                }
            };
        }
        Ok(dir)
    }

    /// Visit every node below this directory in sorted pre-order
    ///
    /// The visitor receives archive-relative paths (`usr`, `usr/bin`,
    /// `usr/bin/foo`); the directory itself is not visited. The first error
    /// returned by the visitor stops the walk.
    pub fn walk<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&str, &Node) -> Result<()>,
    {
        self.walk_recursive("", &mut visitor)
    }

    fn walk_recursive<F>(&self, prefix: &str, visitor: &mut F) -> Result<()>
    where
        F: FnMut(&str, &Node) -> Result<()>,
    {
        for (name, node) in &self.entries {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };

            visitor(&path, node)?;

            if let Node::Directory(d) = node {
                d.walk_recursive(&path, visitor)?;
            }
        }
        Ok(())
    }

    /// Count entries by type
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.count_into(&mut stats);
        stats
    }

    fn count_into(&self, stats: &mut TreeStats) {
        for node in self.entries.values() {
            match node {
                Node::Directory(d) => {
                    stats.directories += 1;
                    d.count_into(stats);
                }
                Node::RegularFile(f) => {
                    stats.files += 1;
                    stats.total_size += f.content.len() as u64;
                }
                Node::Symlink(_) => stats.symlinks += 1,
            }
        }
    }
}

/// Statistics about a payload tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    /// Total size of all regular file contents in bytes
    pub total_size: u64,
}
