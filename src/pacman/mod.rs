// src/pacman/mod.rs

//! pacman package generator
//!
//! Produces `.pkg.tar.xz` archives for Arch Linux and derivatives.
//! A pacman package is a compressed tarball containing:
//! - `.PKGINFO`: package metadata
//! - `.INSTALL`: optional install/upgrade/remove hooks
//! - `.MTREE`: gzip-compressed manifest of every entry
//! - the payload at its install paths

mod install;
mod mtree;
mod pkginfo;
mod relations;
mod version;

pub use install::{render_install, write_install};
pub use mtree::{render_mtree, write_mtree};
pub use pkginfo::{compile_backup_markers, render_pkginfo, write_pkginfo};
pub use relations::compile_relations;
pub use version::full_version_string;

use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use crate::filesystem::{archive, Directory, Node, NodeMetadata, RegularFile};
use crate::generator::Generator;
use crate::package::{Architecture, Package, RegexSet};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Name of the control record member
pub const PKGINFO_PATH: &str = ".PKGINFO";

/// Name of the install hook member
pub const INSTALL_PATH: &str = ".INSTALL";

/// Name of the manifest member
pub const MTREE_PATH: &str = ".MTREE";

/// All members generated by a build, in generation order
pub const GENERATED_MEMBERS: [&str; 3] = [PKGINFO_PATH, INSTALL_PATH, MTREE_PATH];

/// Permission bits of the generated members
pub const MEMBER_MODE: u32 = 0o644;

/// Payload files shipped by pacbuild itself; never marked for backup
pub const RESERVED_DATA_PREFIX: &str = "usr/share/pacbuild/";

/// What pacman accepts for package names and versions
pub static PACMAN_GRAMMAR: LazyLock<RegexSet> = LazyLock::new(|| {
    let name = r"[a-z0-9@._+][a-z0-9@._+-]*";
    let version = r"[a-zA-Z0-9._]+";

    RegexSet::new(
        "pacman",
        name,
        version,
        &format!("(?:except:)?(?:group:)?{}", name),
        &format!("(?:[0-9]+:)?{}(?:-[1-9][0-9]*)?", version),
    )
    .unwrap()
});

/// Architecture string used by pacman
pub fn pacman_arch(arch: Architecture) -> Option<&'static str> {
    let name = match arch {
        Architecture::Any => "any",
        Architecture::I386 => "i686",
        Architecture::X86_64 => "x86_64",
        Architecture::ARMv5 => "arm",
        Architecture::ARMv6h => "armv6h",
        Architecture::ARMv7h => "armv7h",
        Architecture::AArch64 => "aarch64",
    };
    Some(name)
}

/// Whether a top-level entry name is one of the generated members
pub(crate) fn is_generated_member(path: &str) -> bool {
    GENERATED_MEMBERS.contains(&path)
}

/// Insert a generated member at the tree root, replacing any previous one
///
/// Members are owned by root, mode 0644, and share the root's mtime.
fn insert_member(root: &mut Directory, name: &str, content: Vec<u8>) {
    let metadata = NodeMetadata {
        mtime: root.metadata.mtime,
        ..NodeMetadata::with_mode(MEMBER_MODE)
    };
    root.entries
        .insert(name.to_string(), Node::RegularFile(RegularFile { content, metadata }));
}

/// Generator for pacman packages
#[derive(Debug, Clone)]
pub struct PacmanGenerator {
    package: Package,
    compression: CompressionFormat,
}

impl PacmanGenerator {
    /// Create a generator producing xz-compressed packages
    pub fn new(package: Package) -> Self {
        Self {
            package,
            compression: CompressionFormat::Xz,
        }
    }

    /// Use a different payload compression (pacman also reads zstd and gzip)
    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = compression;
        self
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn into_package(self) -> Package {
        self.package
    }
}

impl Generator for PacmanGenerator {
    fn format_name(&self) -> &'static str {
        "pacman"
    }

    fn set_compression(&mut self, compression: CompressionFormat) {
        self.compression = compression;
    }

    fn recommended_file_name(&self) -> String {
        let pkg = &self.package;
        let arch = pacman_arch(pkg.architecture).unwrap_or(pkg.architecture.name());
        format!(
            "{}-{}-{}.pkg.tar.{}",
            pkg.name,
            full_version_string(pkg),
            arch,
            self.compression.extension()
        )
    }

    fn validate(&self) -> Vec<Error> {
        self.package.validate_with(&PACMAN_GRAMMAR, pacman_arch)
    }

    fn build(&mut self) -> Result<Vec<u8>> {
        let pkg = &mut self.package;
        pkg.prepare_build();

        for member in GENERATED_MEMBERS {
            if pkg.fs_root.remove_entry(member).is_some() {
                debug!("Removed stale {} from previous build", member);
            }
        }

        write_pkginfo(pkg).map_err(|e| Error::in_member(PKGINFO_PATH, e))?;
        write_install(pkg);
        write_mtree(&mut pkg.fs_root).map_err(|e| Error::in_member(MTREE_PATH, e))?;

        let mut data = Vec::new();
        archive::write_archive(&pkg.fs_root, &mut data, self.compression)?;

        info!(
            "Built {} {} ({} bytes, {})",
            pkg.name,
            full_version_string(pkg),
            data.len(),
            self.compression
        );
        Ok(data)
    }
}
