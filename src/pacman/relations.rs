// src/pacman/relations.rs

//! Rendering of relationship lists into `.PKGINFO` lines

use super::PACMAN_GRAMMAR;
use crate::error::Result;
use crate::package::Relationship;

/// Render one `.PKGINFO` line per relationship constraint
///
/// `label` is the `.PKGINFO` key (`depend`, `conflict`, `provides`,
/// `replaces`). A relationship without constraints produces a bare
/// `label = name` line. Input order is preserved, and the first name or
/// version that pacman would not accept aborts compilation.
pub fn compile_relations(label: &str, relations: &[Relationship]) -> Result<String> {
    let grammar = &*PACMAN_GRAMMAR;
    let mut lines = String::new();

    for rel in relations {
        if !grammar.related_name.is_match(&rel.name) {
            return Err(grammar.grammar_error(
                "Package name",
                &rel.name,
                format!(" (found in {} {})", label, rel.name),
            ));
        }

        if rel.constraints.is_empty() {
            lines.push_str(&format!("{} = {}\n", label, rel.name));
            continue;
        }

        for constraint in &rel.constraints {
            if !grammar.related_version.is_match(&constraint.version) {
                return Err(grammar.grammar_error(
                    "Version",
                    &constraint.version,
                    format!(" (found in {} {})", label, rel.name),
                ));
            }
            lines.push_str(&format!(
                "{} = {}{}{}\n",
                label, rel.name, constraint.relation, constraint.version
            ));
        }
    }

    Ok(lines)
}
