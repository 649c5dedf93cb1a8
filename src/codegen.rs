//! Stateless helpers for generating JavaScript/TypeScript source.

use std::collections::HashSet;

use indoc::indoc;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ModuleSystem;

lazy_static! {
    static ref NON_IDENTIFIER_CHAR: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
    static ref PLAIN_KEY: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

/// Spaces per nesting level.
pub const INDENT: &str = "  ";

pub const GENERATED_HEADER: &str = indoc! {"
    // This file is automatically generated by textsync.
    // Do not edit it manually, as your changes will be overwritten.
"};

/// Replaces every non-alphanumeric character with `_`.
///
/// ```rust
/// use textsync::codegen::sanitize_identifier;
/// assert_eq!(sanitize_identifier("p1___base.json"), "p1___base_json");
/// assert_eq!(sanitize_identifier("64ab___fr-CA.json"), "_64ab___fr_CA_json");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let sanitized = NON_IDENTIFIER_CHAR.replace_all(name, "_");
    match sanitized.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", sanitized),
        Some(_) => sanitized.into_owned(),
    }
}

/// Hands out sanitized identifiers, suffixing `_1`, `_2`, … on collision.
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    used: HashSet<String>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, name: &str) -> String {
        let base = sanitize_identifier(name);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        candidate
    }
}

pub fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

/// Object key, quoted only when it is not a plain identifier.
pub fn object_key(key: &str) -> String {
    if PLAIN_KEY.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Double-quoted JavaScript string literal.
pub fn quote(value: &str) -> String {
    // JSON string syntax is valid JavaScript.
    serde_json::Value::String(value.to_string()).to_string()
}

pub fn import_statement(system: ModuleSystem, identifier: &str, path: &str) -> String {
    match system {
        ModuleSystem::Module => format!("import {} from {};", identifier, quote(path)),
        ModuleSystem::Commonjs => format!("const {} = require({});", identifier, quote(path)),
    }
}

/// Opening line of the exported object.
pub fn export_open(system: ModuleSystem) -> &'static str {
    match system {
        ModuleSystem::Module => "export default {",
        ModuleSystem::Commonjs => "module.exports = {",
    }
}
