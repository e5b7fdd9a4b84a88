// src/package/mod.rs

//! Format-agnostic package model
//!
//! A [`Package`] describes everything a generator needs: identity, version,
//! relationships to other packages, lifecycle scripts and the payload tree.
//! Generators own the package for the duration of a build.

mod validate;

pub use validate::RegexSet;

use crate::error::{Error, Result};
use crate::filesystem::{Directory, Node};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// CPU architectures a package can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    /// Architecture-independent
    #[default]
    Any,
    I386,
    X86_64,
    ARMv5,
    ARMv6h,
    ARMv7h,
    AArch64,
}

impl Architecture {
    /// Every variant, for exhaustiveness checks of format mappings
    pub const ALL: [Architecture; 7] = [
        Self::Any,
        Self::I386,
        Self::X86_64,
        Self::ARMv5,
        Self::ARMv6h,
        Self::ARMv7h,
        Self::AArch64,
    ];

    /// Canonical format-independent name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::I386 => "i386",
            Self::X86_64 => "x86_64",
            Self::ARMv5 => "armv5",
            Self::ARMv6h => "armv6h",
            Self::ARMv7h => "armv7h",
            Self::AArch64 => "aarch64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" | "all" | "noarch" => Ok(Self::Any),
            "i386" | "i686" => Ok(Self::I386),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "armv5" | "arm" => Ok(Self::ARMv5),
            "armv6h" => Ok(Self::ARMv6h),
            "armv7h" | "armhf" => Ok(Self::ARMv7h),
            "aarch64" | "arm64" => Ok(Self::AArch64),
            _ => Err(Error::Definition(format!("unknown architecture \"{}\"", s))),
        }
    }
}

/// Lifecycle actions a package can attach scripts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Runs after installation and after every upgrade
    Setup,
    /// Runs after removal
    Cleanup,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// A version requirement attached to a relationship, e.g. `>= 1.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// One of `<`, `<=`, `=`, `>=`, `>`
    pub relation: String,
    pub version: String,
}

/// A named link to another package (requires/provides/conflicts/replaces)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Related package name, possibly with `except:` / `group:` modifiers
    pub name: String,
    /// Zero constraints means any version
    pub constraints: Vec<VersionConstraint>,
}

impl Relationship {
    /// Relationship on any version of `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Add a version constraint
    pub fn with_constraint(mut self, relation: &str, version: impl Into<String>) -> Self {
        self.constraints.push(VersionConstraint {
            relation: relation.to_string(),
            version: version.into(),
        });
        self
    }

    /// Parse a relationship string like `glibc>=2.34`, `foo = 1.0` or `bar`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let Some(pos) = input.find(['<', '>', '=']) else {
            if input.is_empty() {
                return Err(Error::Definition("empty relationship".to_string()));
            }
            return Ok(Self::new(input));
        };

        let (name, rest) = input.split_at(pos);
        let relation = ["<=", ">=", "<", ">", "="]
            .into_iter()
            .find(|op| rest.starts_with(op))
            .unwrap_or("=");
        let version = rest[relation.len()..].trim();
        let name = name.trim();

        if name.is_empty() || version.is_empty() {
            return Err(Error::Definition(format!(
                "cannot parse relationship \"{}\"",
                input
            )));
        }

        Ok(Self::new(name).with_constraint(relation, version))
    }
}

/// A package to be built
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Release number of this version's packaging (pkgrel)
    pub release: u32,
    /// Version ordering override; 0 means no epoch
    pub epoch: u32,
    pub description: String,
    pub author: String,
    pub architecture: Architecture,
    pub requires: Vec<Relationship>,
    pub provides: Vec<Relationship>,
    pub conflicts: Vec<Relationship>,
    pub replaces: Vec<Relationship>,
    pub scripts: BTreeMap<Action, String>,
    /// Payload tree; entries are archive-relative
    pub fs_root: Directory,
}

impl Package {
    /// Create a package with release 1, no epoch and an empty payload
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: 1,
            epoch: 0,
            description: String::new(),
            author: String::new(),
            architecture: Architecture::Any,
            requires: Vec::new(),
            provides: Vec::new(),
            conflicts: Vec::new(),
            replaces: Vec::new(),
            scripts: BTreeMap::new(),
            fs_root: Directory::new(),
        }
    }

    /// Script body for a lifecycle action, or "" when there is none
    pub fn script(&self, action: Action) -> &str {
        self.scripts.get(&action).map(String::as_str).unwrap_or("")
    }

    /// All relationship lists with the name of their kind
    pub fn relations(&self) -> [(&'static str, &[Relationship]); 4] {
        [
            ("requires", &self.requires),
            ("provides", &self.provides),
            ("conflicts", &self.conflicts),
            ("replaces", &self.replaces),
        ]
    }

    /// Normalize the package before member generation
    ///
    /// Script bodies lose trailing whitespace and whitespace-only scripts are
    /// dropped. Calling this more than once has no further effect.
    pub fn prepare_build(&mut self) {
        self.scripts.retain(|_, body| {
            let trimmed_len = body.trim_end().len();
            body.truncate(trimmed_len);
            !body.trim_start().is_empty()
        });

        debug!(
            "Prepared {} {}: {} scripts, {} payload bytes",
            self.name,
            self.version,
            self.scripts.len(),
            self.fs_root.stats().total_size
        );
    }

    /// Visit every payload entry with its archive-relative path
    pub fn walk_fs_with_relative_paths<F>(&self, visitor: F) -> Result<()>
    where
        F: FnMut(&str, &Node) -> Result<()>,
    {
        self.fs_root.walk(visitor)
    }

    /// Check names, versions and the architecture against a format's grammar
    ///
    /// Returns every violation found; an empty list means the package is
    /// acceptable for the format.
    pub fn validate_with(
        &self,
        grammar: &RegexSet,
        arch_map: impl Fn(Architecture) -> Option<&'static str>,
    ) -> Vec<Error> {
        validate::validate(self, grammar, arch_map)
    }
}
