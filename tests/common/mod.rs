// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pacbuild::compression::{self, CompressionFormat};
use pacbuild::{Action, Architecture, NodeMetadata, Package, RegularFile, Relationship, Symlink};
use std::io::Read;
use tar::{Archive, EntryType};

/// One entry read back from a built package
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub entry_type: EntryType,
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    pub content: Vec<u8>,
    pub link_target: Option<String>,
}

/// Decompress a package (format detected from magic bytes) and list its entries.
pub fn read_package(data: &[u8]) -> Vec<ArchiveEntry> {
    let tar_data = compression::decompress_auto(data).unwrap();
    let mut archive = Archive::new(tar_data.as_slice());
    let mut entries = Vec::new();

    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let path = entry
            .path()
            .unwrap()
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();
        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header.mode().unwrap();
        let uid = header.uid().unwrap();
        let gid = header.gid().unwrap();
        let link_target = entry
            .link_name()
            .unwrap()
            .map(|target| target.to_string_lossy().to_string());

        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();

        entries.push(ArchiveEntry {
            path,
            entry_type,
            mode,
            uid,
            gid,
            content,
            link_target,
        });
    }

    entries
}

/// Find an entry by path.
pub fn find<'a>(entries: &'a [ArchiveEntry], path: &str) -> Option<&'a ArchiveEntry> {
    entries.iter().find(|entry| entry.path == path)
}

/// Content of a text member, panicking when it is missing.
pub fn member_text(entries: &[ArchiveEntry], path: &str) -> String {
    let entry = find(entries, path).unwrap_or_else(|| panic!("{} missing from package", path));
    String::from_utf8(entry.content.clone()).unwrap()
}

/// The decompressed `.MTREE` document of a package.
pub fn mtree_text(entries: &[ArchiveEntry]) -> String {
    let entry = find(entries, ".MTREE").expect(".MTREE missing from package");
    let document = compression::decompress(&entry.content, CompressionFormat::Gzip).unwrap();
    String::from_utf8(document).unwrap()
}

/// Create the `foo 1.0-1` package used across the integration tests:
/// one executable, one config file, one symlink and one data file below the
/// reserved prefix.
pub fn sample_package() -> Package {
    let parents = NodeMetadata::with_mode(0o755);
    let mut pkg = Package::new("foo", "1.0");
    pkg.description = "Example   package\nfor tests".to_string();
    pkg.author = "Jane Doe <jane@example.org>".to_string();
    pkg.architecture = Architecture::X86_64;
    pkg.requires.push(Relationship::new("glibc").with_constraint(">=", "2.34"));
    pkg.provides.push(Relationship::new("foo-bin"));

    pkg.fs_root
        .add("usr/bin/foo", RegularFile::new("#!/bin/sh\necho foo\n", 0o755), parents)
        .unwrap();
    pkg.fs_root
        .add("etc/foo.conf", RegularFile::new("verbose = false\n", 0o644), parents)
        .unwrap();
    pkg.fs_root
        .add("usr/bin/foo-compat", Symlink::new("foo"), parents)
        .unwrap();
    pkg.fs_root
        .add(
            "usr/share/pacbuild/foo.toml",
            RegularFile::new("[package]\n", 0o644),
            parents,
        )
        .unwrap();
    pkg
}

/// `sample_package` with a setup and a cleanup script.
pub fn sample_package_with_scripts() -> Package {
    let mut pkg = sample_package();
    pkg.scripts
        .insert(Action::Setup, "systemctl daemon-reload".to_string());
    pkg.scripts
        .insert(Action::Cleanup, "rm -rf /var/cache/foo".to_string());
    pkg
}
