// src/pacman/pkginfo.rs

//! `.PKGINFO` generation
//!
//! The field order below is what makepkg writes; pacman and the repo tools
//! read it line by line.

use super::{
    full_version_string, insert_member, is_generated_member, pacman_arch, relations::compile_relations,
    PKGINFO_PATH, RESERVED_DATA_PREFIX,
};
use crate::error::{Error, Result};
use crate::filesystem::{Directory, Node};
use crate::package::{Architecture, Package};
use tracing::debug;

/// Placeholder used when a package has no author
const UNKNOWN_PACKAGER: &str = "Unknown Packager";

/// Build options recorded for every package; the payload is archived as given
const MAKEPKG_OPTIONS: [&str; 9] = [
    "!strip",
    "docs",
    "libtool",
    "staticlibs",
    "emptydirs",
    "!zipman",
    "!purge",
    "!upx",
    "!debug",
];

/// Render the `.PKGINFO` member and insert it at the root of the payload tree
pub fn write_pkginfo(pkg: &mut Package) -> Result<()> {
    let content = render_pkginfo(pkg)?;
    debug!("Writing {} ({} bytes)", PKGINFO_PATH, content.len());
    insert_member(&mut pkg.fs_root, PKGINFO_PATH, content.into_bytes());
    Ok(())
}

/// Render the `.PKGINFO` text for a package
pub fn render_pkginfo(pkg: &Package) -> Result<String> {
    render_pkginfo_with(pkg, pacman_arch)
}

/// Render `.PKGINFO` using `arch_map` to name the architecture
///
/// An architecture the map has no name for is reported as
/// [`Error::MissingMapping`] rather than written as an empty `arch` field.
pub(crate) fn render_pkginfo_with(
    pkg: &Package,
    arch_map: impl Fn(Architecture) -> Option<&'static str>,
) -> Result<String> {
    let arch = arch_map(pkg.architecture).ok_or_else(|| Error::MissingMapping {
        kind: "Architecture",
        value: pkg.architecture.to_string(),
        format: "pacman",
    })?;

    let packager = if pkg.author.is_empty() {
        UNKNOWN_PACKAGER
    } else {
        pkg.author.as_str()
    };
    let description = pkg.description.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut info = String::new();
    info.push_str("# Generated by pacbuild\n");
    info.push_str(&format!("pkgname = {}\n", pkg.name));
    info.push_str(&format!("pkgver = {}\n", full_version_string(pkg)));
    info.push_str(&format!("pkgdesc = {}\n", description));
    info.push_str("url = \n");
    info.push_str(&format!("packager = {}\n", packager));
    info.push_str(&format!("size = {}\n", installed_size(&pkg.fs_root)));
    info.push_str(&format!("arch = {}\n", arch));
    info.push_str("license = custom:none\n");

    info.push_str(&compile_relations("replaces", &pkg.replaces)?);
    info.push_str(&compile_relations("conflict", &pkg.conflicts)?);
    info.push_str(&compile_relations("provides", &pkg.provides)?);
    info.push_str(&compile_backup_markers(&pkg.fs_root)?);
    info.push_str(&compile_relations("depend", &pkg.requires)?);

    info.push_str("makedepend = pacbuild\n");
    for option in MAKEPKG_OPTIONS {
        info.push_str(&format!("makepkgopt = {}\n", option));
    }

    Ok(info)
}

/// `backup = <path>` lines for every regular file of the payload
///
/// Files below [`RESERVED_DATA_PREFIX`] and the generated control members are
/// left out. Lines are sorted by path.
pub fn compile_backup_markers(root: &Directory) -> Result<String> {
    let mut paths = Vec::new();

    root.walk(|path, node| {
        if matches!(node, Node::RegularFile(_))
            && !path.starts_with(RESERVED_DATA_PREFIX)
            && !is_generated_member(path)
        {
            paths.push(path.to_string());
        }
        Ok(())
    })?;

    paths.sort();
    Ok(paths
        .iter()
        .map(|path| format!("backup = {}\n", path))
        .collect())
}

/// Installed size of the payload, ignoring generated members
fn installed_size(root: &Directory) -> u64 {
    root.entries
        .iter()
        .filter(|(name, _)| !is_generated_member(name))
        .map(|(_, node)| node.installed_size_in_bytes())
        .sum()
}
