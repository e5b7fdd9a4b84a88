// tests/definition.rs
//! Integration tests for package definition files
//!
//! Definitions are written to a temporary directory, loaded and built into
//! packages; the CLI is exercised against the same files.

mod common;

use common::{find, member_text, read_package};
use pacbuild::definition::PackageDefinition;
use pacbuild::{Generator, PacmanGenerator};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const DEFINITION: &str = r#"
[package]
name = "hello"
version = "2.12"
release = 3
description = "Prints a friendly greeting"
author = "Jane Doe <jane@example.org>"
architecture = "x86_64"
requires = ["glibc >= 2.34"]
setupScript = "echo installed hello"

[[directory]]
path = "/var/lib/hello"
mode = 0o750

[[file]]
path = "/usr/bin/hello"
contentFrom = "hello.sh"
mode = 0o755

[[file]]
path = "/etc/hello.conf"
content = "greeting = hi\n"

[[symlink]]
path = "/usr/bin/hi"
target = "hello"
"#;

/// Write the definition plus its contentFrom source to a fresh directory.
fn write_definition(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("hello.sh"), "#!/bin/sh\necho hello\n").unwrap();
    let path = temp_dir.path().join("hello.toml");
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

fn pacbuild(args: &[&str], dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pacbuild"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn test_definition_builds_package() {
    let (temp_dir, path) = write_definition(DEFINITION);
    let pkg = PackageDefinition::from_file(&path)
        .unwrap()
        .into_package(temp_dir.path(), 1_700_000_000)
        .unwrap();

    let mut generator = PacmanGenerator::new(pkg);
    assert!(generator.validate().is_empty());
    assert_eq!(generator.recommended_file_name(), "hello-2.12-3-x86_64.pkg.tar.xz");

    let entries = read_package(&generator.build().unwrap());
    let binary = find(&entries, "usr/bin/hello").unwrap();
    assert_eq!(binary.content, b"#!/bin/sh\necho hello\n");
    assert_eq!(binary.mode, 0o755);
    assert_eq!(find(&entries, "var/lib/hello").unwrap().mode, 0o750);

    let pkginfo = member_text(&entries, ".PKGINFO");
    assert!(pkginfo.contains("\ndepend = glibc>=2.34\n"));
    assert!(pkginfo.contains("\nbackup = etc/hello.conf\nbackup = usr/bin/hello\n"));
    assert!(member_text(&entries, ".INSTALL").contains("echo installed hello"));
}

#[test]
fn test_cli_build_writes_package() {
    let (temp_dir, path) = write_definition(DEFINITION);
    let out_dir = temp_dir.path().join("out");

    let output = pacbuild(
        &["build", path.to_str().unwrap(), "-o", out_dir.to_str().unwrap()],
        temp_dir.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "hello-2.12-3-x86_64.pkg.tar.xz"
    );

    let data = fs::read(out_dir.join("hello-2.12-3-x86_64.pkg.tar.xz")).unwrap();
    let entries = read_package(&data);
    assert!(find(&entries, ".MTREE").is_some());

    // Only the finished package is left behind
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
}

#[test]
fn test_cli_build_to_stdout_matches_library_build() {
    let (temp_dir, path) = write_definition(DEFINITION);

    let output = pacbuild(&["build", path.to_str().unwrap(), "--stdout"], temp_dir.path());
    assert!(output.status.success());

    let pkg = pacbuild::definition::load(&path).unwrap();
    let expected = PacmanGenerator::new(pkg).build().unwrap();
    assert_eq!(output.stdout, expected);
}

#[test]
fn test_cli_filename_with_compression() {
    let (temp_dir, path) = write_definition(DEFINITION);
    let output = pacbuild(
        &["filename", path.to_str().unwrap(), "--compression", "zstd"],
        temp_dir.path(),
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "hello-2.12-3-x86_64.pkg.tar.zst"
    );
}

#[test]
fn test_cli_validate_reports_every_error() {
    let invalid = DEFINITION
        .replace("name = \"hello\"", "name = \"Hello\"")
        .replace("version = \"2.12\"", "version = \"2.12-beta\"");
    let (temp_dir, path) = write_definition(&invalid);

    let output = pacbuild(&["validate", path.to_str().unwrap()], temp_dir.path());
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Package name \"Hello\""), "{}", stderr);
    assert!(stderr.contains("Package version \"2.12-beta\""), "{}", stderr);

    let valid = write_definition(DEFINITION);
    let output = pacbuild(&["validate", valid.1.to_str().unwrap()], valid.0.path());
    assert!(output.status.success());
}

#[test]
fn test_cli_rejects_broken_definition() {
    let broken = format!("{}\n[[file]]\npath = \"/../etc/shadow\"\ncontent = \"\"\n", DEFINITION);
    let (temp_dir, path) = write_definition(&broken);

    let output = pacbuild(&["build", path.to_str().unwrap()], temp_dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load"));
}
