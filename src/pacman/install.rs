// src/pacman/install.rs

//! `.INSTALL` generation
//!
//! pacman sources `.INSTALL` and calls the hook functions it defines.
//! Upgrades re-run the full setup script.

use super::{insert_member, INSTALL_PATH};
use crate::package::{Action, Package};
use tracing::debug;

/// Insert `.INSTALL` when the package has a setup or cleanup script
pub fn write_install(pkg: &mut Package) {
    let Some(script) = render_install(pkg.script(Action::Setup), pkg.script(Action::Cleanup))
    else {
        debug!("No lifecycle scripts, skipping {}", INSTALL_PATH);
        return;
    };

    debug!("Writing {} ({} bytes)", INSTALL_PATH, script.len());
    insert_member(&mut pkg.fs_root, INSTALL_PATH, script.into_bytes());
}

/// Render the hook functions, or `None` when both bodies are empty
pub fn render_install(setup: &str, cleanup: &str) -> Option<String> {
    let mut script = String::new();

    if !setup.is_empty() {
        script.push_str(&format!(
            "post_install() {{\n{}\n}}\npost_upgrade() {{\npost_install\n}}\n",
            setup
        ));
    }
    if !cleanup.is_empty() {
        script.push_str(&format!("post_remove() {{\n{}\n}}\n", cleanup));
    }

    (!script.is_empty()).then_some(script)
}
