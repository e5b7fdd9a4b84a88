// src/package/validate.rs

//! Grammar checks for package identities
//!
//! Each output format accepts a different alphabet for package names and
//! versions. A format describes its alphabet as a [`RegexSet`] and the
//! package is checked against it before any member is generated, so that
//! all problems are reported together.

use super::{Architecture, Package};
use crate::error::Error;
use regex::Regex;

/// Anchored patterns describing what a package format accepts
#[derive(Debug, Clone)]
pub struct RegexSet {
    /// Format name used in error messages, e.g. "pacman"
    pub format_name: &'static str,
    pub package_name: Regex,
    pub package_version: Regex,
    /// Names appearing in relationships (may carry modifiers)
    pub related_name: Regex,
    /// Versions appearing in relationship constraints (may carry epoch/release)
    pub related_version: Regex,
}

impl RegexSet {
    /// Compile a set from unanchored pattern bodies
    ///
    /// Every pattern is wrapped in `^(?:...)$` so it must match the whole value.
    pub fn new(
        format_name: &'static str,
        package_name: &str,
        package_version: &str,
        related_name: &str,
        related_version: &str,
    ) -> Result<Self, regex::Error> {
        let anchored = |pattern: &str| Regex::new(&format!("^(?:{})$", pattern));

        Ok(Self {
            format_name,
            package_name: anchored(package_name)?,
            package_version: anchored(package_version)?,
            related_name: anchored(related_name)?,
            related_version: anchored(related_version)?,
        })
    }

    /// Build the error reported when `value` does not match this grammar
    pub(crate) fn grammar_error(&self, subject: &'static str, value: &str, location: String) -> Error {
        Error::Grammar {
            subject,
            value: value.to_string(),
            format: self.format_name,
            location,
        }
    }
}

/// Collect every grammar violation of `pkg`
pub(super) fn validate(
    pkg: &Package,
    grammar: &RegexSet,
    arch_map: impl Fn(Architecture) -> Option<&'static str>,
) -> Vec<Error> {
    let mut errors = Vec::new();

    if !grammar.package_name.is_match(&pkg.name) {
        errors.push(grammar.grammar_error("Package name", &pkg.name, String::new()));
    }
    if !grammar.package_version.is_match(&pkg.version) {
        errors.push(grammar.grammar_error("Package version", &pkg.version, String::new()));
    }

    for (kind, relations) in pkg.relations() {
        for rel in relations {
            if !grammar.related_name.is_match(&rel.name) {
                errors.push(grammar.grammar_error(
                    "Package name",
                    &rel.name,
                    format!(" (found in {})", kind),
                ));
            }
            for constraint in &rel.constraints {
                if !grammar.related_version.is_match(&constraint.version) {
                    errors.push(grammar.grammar_error(
                        "Version",
                        &constraint.version,
                        format!(" (found in {} {})", kind, rel.name),
                    ));
                }
            }
        }
    }

    if arch_map(pkg.architecture).is_none() {
        errors.push(Error::MissingMapping {
            kind: "Architecture",
            value: pkg.architecture.to_string(),
            format: grammar.format_name,
        });
    }

    errors
}
