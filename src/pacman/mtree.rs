// src/pacman/mtree.rs

//! `.MTREE` generation
//!
//! The manifest is a gzip-compressed mtree(5) document in the dialect
//! written by bsdtar for makepkg. pacman uses it to verify installed files
//! (`pacman -Qkk`), so every payload entry is listed with its type,
//! permissions, ownership and, for regular files, MD5 and SHA-256 digests.

use super::{insert_member, MTREE_PATH};
use crate::compression::{self, CompressionFormat};
use crate::error::Result;
use crate::filesystem::{DEFAULT_FILE_MODE, Directory, Node, NodeMetadata};
use crate::hash::{self, HashAlgorithm};
use tracing::debug;

const MTREE_HEADER: &str = "#mtree\n/set type=file uid=0 gid=0 mode=644\n";

const DIGESTS: [HashAlgorithm; 2] = [HashAlgorithm::Md5, HashAlgorithm::Sha256];

/// Render the manifest of `root`, compress it and insert it as `.MTREE`
///
/// Members inserted before this call (`.PKGINFO`, `.INSTALL`) are covered
/// by the manifest.
pub fn write_mtree(root: &mut Directory) -> Result<()> {
    let document = render_mtree(root)?;
    let compressed = compression::compress(document.as_bytes(), CompressionFormat::Gzip)?;

    debug!(
        "Writing {} ({} bytes, {} uncompressed)",
        MTREE_PATH,
        compressed.len(),
        document.len()
    );
    insert_member(root, MTREE_PATH, compressed);
    Ok(())
}

/// Render the uncompressed mtree document for a tree
pub fn render_mtree(root: &Directory) -> Result<String> {
    let mut document = String::from(MTREE_HEADER);

    root.walk(|path, node| {
        let metadata = node.metadata();
        let mut line = format!("./{} time={}.0", escape(path), metadata.mtime);

        match node {
            Node::Directory(_) => {
                push_mode_and_owner(&mut line, metadata);
                line.push_str(" type=dir");
            }
            Node::RegularFile(file) => {
                if metadata.mode != DEFAULT_FILE_MODE {
                    push_mode_and_owner(&mut line, metadata);
                } else {
                    push_owner(&mut line, metadata);
                }
                line.push_str(&format!(" size={}", file.content.len()));

                let digests = hash::hash_reader_multi(&DIGESTS, &mut file.content.as_slice())?;
                for (algorithm, digest) in DIGESTS.iter().zip(digests) {
                    line.push_str(&format!(" {}={}", algorithm.mtree_keyword(), digest));
                }
            }
            Node::Symlink(link) => {
                push_mode_and_owner(&mut line, metadata);
                line.push_str(&format!(" type=link link={}", escape(&link.target)));
            }
        }

        document.push_str(&line);
        document.push('\n');
        Ok(())
    })?;

    Ok(document)
}

fn push_mode_and_owner(line: &mut String, metadata: &NodeMetadata) {
    line.push_str(&format!(" mode={:o}", metadata.mode & 0o7777));
    push_owner(line, metadata);
}

fn push_owner(line: &mut String, metadata: &NodeMetadata) {
    if metadata.uid != 0 {
        line.push_str(&format!(" uid={}", metadata.uid));
    }
    if metadata.gid != 0 {
        line.push_str(&format!(" gid={}", metadata.gid));
    }
}

/// Escape a path for mtree: bytes outside printable ASCII and the
/// characters ` `, `#`, `=` and `\` become `\ooo`
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        if byte.is_ascii_graphic() && !matches!(byte, b'#' | b'=' | b'\\') {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("\\{:03o}", byte));
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{RegularFile, Symlink};

    fn sample_tree() -> Directory {
        let parents = NodeMetadata {
            mtime: 1_500_000_000,
            ..NodeMetadata::with_mode(0o755)
        };
        let mut root = Directory::new();

        let mut script = RegularFile::new("hello world\n", 0o755);
        script.metadata.mtime = 1_500_000_000;
        root.add("usr/bin/foo", script, parents).unwrap();

        let mut config = RegularFile::new("", 0o644);
        config.metadata.gid = 42;
        root.add("etc/foo.conf", config, parents).unwrap();

        root.add("usr/lib/libfoo.so", Symlink::new("libfoo.so.1"), parents)
            .unwrap();
        root
    }

    #[test]
    fn test_render_mtree_lines() {
        let document = render_mtree(&sample_tree()).unwrap();
        let expected = [
            "#mtree",
            "/set type=file uid=0 gid=0 mode=644",
            "./etc time=1500000000.0 mode=755 type=dir",
            "./etc/foo.conf time=0.0 gid=42 size=0 \
             md5digest=d41d8cd98f00b204e9800998ecf8427e \
             sha256digest=e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            "./usr time=1500000000.0 mode=755 type=dir",
            "./usr/bin time=1500000000.0 mode=755 type=dir",
            "./usr/bin/foo time=1500000000.0 mode=755 size=12 \
             md5digest=6f5902ac237024bdd0c176cb93063dc4 \
             sha256digest=a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447",
            "./usr/lib time=1500000000.0 mode=755 type=dir",
            "./usr/lib/libfoo.so time=0.0 mode=777 type=link link=libfoo.so.1",
        ];
        let lines: Vec<&str> = document.lines().collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("usr/share/doc/foo"), "usr/share/doc/foo");
        assert_eq!(escape("my file"), "my\\040file");
        assert_eq!(escape("a=b#c\\d"), "a\\075b\\043c\\134d");
        assert_eq!(escape("caf\u{e9}"), "caf\\303\\251");
    }

    #[test]
    fn test_write_mtree_inserts_gzip_member() {
        let mut root = sample_tree();
        write_mtree(&mut root).unwrap();

        let Some(Node::RegularFile(member)) = root.get(MTREE_PATH) else {
            panic!(".MTREE missing");
        };
        assert_eq!(member.metadata.mode, 0o644);
        assert_eq!(
            CompressionFormat::from_magic_bytes(&member.content),
            Some(CompressionFormat::Gzip)
        );

        let decompressed = compression::decompress(&member.content, CompressionFormat::Gzip).unwrap();
        assert_eq!(
            String::from_utf8(decompressed).unwrap(),
            render_mtree(&sample_tree()).unwrap()
        );
    }

    #[test]
    fn test_mtree_is_deterministic() {
        let mut first = sample_tree();
        let mut second = sample_tree();
        write_mtree(&mut first).unwrap();
        write_mtree(&mut second).unwrap();
        assert_eq!(first.get(MTREE_PATH), second.get(MTREE_PATH));
    }
}
