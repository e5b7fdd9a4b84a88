// src/filesystem/path.rs

//! Path sanitization for payload entries
//!
//! Payload paths come from package definitions written by hand, so they are
//! normalized to the archive-relative form (`usr/bin/foo`) and rejected when
//! they could escape the package root.

use crate::error::{Error, Result};

/// Normalize a payload path to its archive-relative form
///
/// This function:
/// 1. Rejects paths containing `..` (parent directory) components
/// 2. Skips `.` and empty components (`usr//bin/./foo`)
/// 3. Strips leading slashes to make the path relative
/// 4. Returns an error for empty paths
///
/// # Examples
///
/// ```
/// use pacbuild::filesystem::path::sanitize_path;
///
/// assert_eq!(sanitize_path("/usr/bin/foo").unwrap(), "usr/bin/foo");
/// assert_eq!(sanitize_path("usr/./bin//foo/").unwrap(), "usr/bin/foo");
/// assert!(sanitize_path("usr/../../etc/passwd").is_err());
/// assert!(sanitize_path("/").is_err());
/// ```
pub fn sanitize_path(path: &str) -> Result<String> {
    Ok(components(path)?.join("/"))
}

/// Split a payload path into its normalized components
pub fn components(path: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => return Err(Error::PathTraversal(path.to_string())),
            name => parts.push(name),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(format!(
            "\"{}\" is empty after sanitization",
            path
        )));
    }

    Ok(parts)
}

/// Validate a single path component (a directory entry name)
///
/// This is stricter than `sanitize_path` - it rejects any path separators.
pub fn sanitize_filename(name: &str) -> Result<&str> {
    if name.contains('/') {
        return Err(Error::PathTraversal(format!(
            "Filename contains path separator: {}",
            name
        )));
    }

    if name == ".." || name == "." {
        return Err(Error::PathTraversal(format!("Invalid filename: {}", name)));
    }

    if name.is_empty() {
        return Err(Error::InvalidPath("Empty filename".to_string()));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_normal() {
        assert_eq!(sanitize_path("usr/bin/foo").unwrap(), "usr/bin/foo");
        assert_eq!(sanitize_path("usr/lib/libfoo.so").unwrap(), "usr/lib/libfoo.so");
    }

    #[test]
    fn test_sanitize_path_leading_slash() {
        assert_eq!(sanitize_path("/usr/bin/foo").unwrap(), "usr/bin/foo");
        assert_eq!(sanitize_path("///usr/bin/foo").unwrap(), "usr/bin/foo");
    }

    #[test]
    fn test_sanitize_path_dot_and_empty_components() {
        assert_eq!(sanitize_path("./usr/bin/foo").unwrap(), "usr/bin/foo");
        assert_eq!(sanitize_path("usr/./bin//foo/").unwrap(), "usr/bin/foo");
    }

    #[test]
    fn test_sanitize_path_traversal_rejected() {
        assert!(matches!(sanitize_path(".."), Err(Error::PathTraversal(_))));
        assert!(sanitize_path("../etc/passwd").is_err());
        assert!(sanitize_path("usr/../../../etc/passwd").is_err());
        assert!(sanitize_path("/usr/../etc/passwd").is_err());
    }

    #[test]
    fn test_sanitize_path_empty_rejected() {
        assert!(matches!(sanitize_path(""), Err(Error::InvalidPath(_))));
        assert!(sanitize_path("/").is_err());
        assert!(sanitize_path("./").is_err());
    }

    #[test]
    fn test_components() {
        assert_eq!(components("/usr/bin/foo").unwrap(), vec!["usr", "bin", "foo"]);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(".PKGINFO").unwrap(), ".PKGINFO");
        assert!(sanitize_filename("usr/bin").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename(".").is_err());
        assert!(sanitize_filename("").is_err());
    }
}
