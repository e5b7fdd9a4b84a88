// src/pacman/version.rs

use crate::package::Package;

/// Version as pacman spells it: `[epoch:]version-release`
///
/// The epoch segment is left out when the epoch is 0. The same string is used
/// for `pkgver` in `.PKGINFO` and in the package file name.
pub fn full_version_string(pkg: &Package) -> String {
    if pkg.epoch > 0 {
        format!("{}:{}-{}", pkg.epoch, pkg.version, pkg.release)
    } else {
        format!("{}-{}", pkg.version, pkg.release)
    }
}
