// src/filesystem/archive.rs

//! Serialization of a payload tree into a compressed tar archive
//!
//! Headers are built from node metadata rather than from the host
//! filesystem, so the archive depends only on the tree. Symlinks are stored
//! as link entries and never followed.

use crate::compression::{self, CompressionFormat};
use crate::error::Result;
use crate::filesystem::{Directory, Node};
use std::io::{self, Write};
use tar::{Builder as TarBuilder, EntryType, Header};
use tracing::debug;

/// Write `root` as a compressed tar archive into `sink`
///
/// The root directory itself is not stored; entries appear in sorted
/// pre-order with archive-relative names (no leading `./`).
pub fn write_archive<W: Write>(
    root: &Directory,
    mut sink: W,
    format: CompressionFormat,
) -> Result<()> {
    let tar_data = build_tar(root)?;
    let compressed = compression::compress(&tar_data, format)?;

    debug!(
        "Compressed {} byte tar stream to {} bytes ({})",
        tar_data.len(),
        compressed.len(),
        format
    );

    sink.write_all(&compressed)?;
    sink.flush()?;
    Ok(())
}

/// Build the uncompressed tar stream for a tree
pub fn build_tar(root: &Directory) -> Result<Vec<u8>> {
    let mut archive = TarBuilder::new(Vec::new());

    root.walk(|path, node| {
        let metadata = node.metadata();
        let mut header = Header::new_gnu();
        header.set_mode(metadata.mode);
        header.set_uid(u64::from(metadata.uid));
        header.set_gid(u64::from(metadata.gid));
        header.set_mtime(metadata.mtime);

        match node {
            Node::Directory(_) => {
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                archive.append_data(&mut header, path, io::empty())?;
            }
            Node::RegularFile(file) => {
                header.set_entry_type(EntryType::Regular);
                header.set_size(file.content.len() as u64);
                archive.append_data(&mut header, path, file.content.as_slice())?;
            }
            Node::Symlink(link) => {
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                archive.append_link(&mut header, path, &link.target)?;
            }
        }
        Ok(())
    })?;

    Ok(archive.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{NodeMetadata, RegularFile, Symlink};
    use std::io::Read;
    use tar::Archive;

    fn sample_tree() -> Directory {
        let parents = NodeMetadata::with_mode(0o755);
        let mut root = Directory::new();
        root.add("usr/bin/foo", RegularFile::new("#!/bin/sh\necho foo\n", 0o755), parents)
            .unwrap();
        root.add("usr/bin/foo-link", Symlink::new("foo"), parents).unwrap();
        root
    }

    #[test]
    fn test_tar_entries_follow_tree_order() {
        let tar_data = build_tar(&sample_tree()).unwrap();
        let mut archive = Archive::new(tar_data.as_slice());

        let mut seen = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().trim_end_matches('/').to_string();
            let entry_type = entry.header().entry_type();
            let mode = entry.header().mode().unwrap();

            match path.as_str() {
                "usr" | "usr/bin" => {
                    assert!(entry_type.is_dir());
                    assert_eq!(mode, 0o755);
                }
                "usr/bin/foo" => {
                    assert!(entry_type.is_file());
                    assert_eq!(mode, 0o755);
                    let mut content = String::new();
                    entry.read_to_string(&mut content).unwrap();
                    assert_eq!(content, "#!/bin/sh\necho foo\n");
                }
                "usr/bin/foo-link" => {
                    assert!(entry_type.is_symlink());
                    let target = entry.link_name().unwrap().unwrap();
                    assert_eq!(target.to_string_lossy(), "foo");
                }
                other => panic!("unexpected entry {}", other),
            }
            seen.push(path);
        }

        assert_eq!(seen, vec!["usr", "usr/bin", "usr/bin/foo", "usr/bin/foo-link"]);
    }

    #[test]
    fn test_long_paths_are_preserved() {
        let long_name = "d".repeat(150);
        let mut root = Directory::new();
        root.add(
            &format!("usr/share/{}/file", long_name),
            RegularFile::new("x", 0o644),
            NodeMetadata::with_mode(0o755),
        )
        .unwrap();

        let tar_data = build_tar(&root).unwrap();
        let mut archive = Archive::new(tar_data.as_slice());
        let paths: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(paths.contains(&format!("usr/share/{}/file", long_name)));
    }

    #[test]
    fn test_write_archive_is_deterministic() {
        let tree = sample_tree();
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_archive(&tree, &mut first, CompressionFormat::Xz).unwrap();
        write_archive(&tree, &mut second, CompressionFormat::Xz).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            CompressionFormat::from_magic_bytes(&first),
            Some(CompressionFormat::Xz)
        );
    }
}
