//! Framework driver generation.
//!
//! A driver is one importable module that pulls in every generated JSON file
//! and re-exports them grouped by variant, so an i18n framework can be
//! initialised with a single import:
//!
//! ```text
//! import p1___base_json from "./p1___base.json";
//! import p1___fr_json from "./p1___fr.json";
//!
//! export default {
//!   base: {
//!     ...p1___base_json,
//!   },
//!   fr: {
//!     ...p1___fr_json,
//!   },
//! };
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::{
    codegen::{self, GENERATED_HEADER, IdentifierAllocator},
    config::{Framework, FrameworkConfig},
    types::{BASE_VARIANT, FileContent, OutputFile},
};

lazy_static! {
    static ref DOUBLE_CURLY: Regex = Regex::new(r"\{\{+([^{}]*)\}\}+").unwrap();
}

/// Name of the generated driver, without extension.
pub const DRIVER_FILENAME: &str = "index";

/// Rewrites `{{name}}` placeholders to `{name}`, the syntax vue-i18n expects.
///
/// Runs of three or more braces (`{{{name}}}`) collapse to one as well.
pub fn single_curly(text: &str) -> String {
    DOUBLE_CURLY.replace_all(text, "{$1}").into_owned()
}

/// Applies [`single_curly`] to every string value in every JSON file.
pub fn rewrite_interpolation(files: &mut [OutputFile]) {
    for file in files.iter_mut() {
        if let Some(map) = file.json_mut() {
            map.values_mut().for_each(rewrite_value);
        }
    }
}

fn rewrite_value(value: &mut Value) {
    match value {
        Value::String(text) => {
            if text.contains("{{") {
                *text = single_curly(text);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_value),
        Value::Object(map) => map.values_mut().for_each(rewrite_value),
        _ => {}
    }
}

/// Generates the driver module for the given JSON files, keyed by file name.
///
/// Files without a variant (such as `variables.json`) are left out.
pub fn generate(
    files: &BTreeMap<String, &OutputFile>,
    config: &FrameworkConfig,
    out_dir: &Path,
) -> OutputFile {
    let mut allocator = IdentifierAllocator::new();
    let mut imports = Vec::new();
    let mut by_variant: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (filename, file) in files {
        let Some(variant_id) = file.metadata.variant_id.as_deref() else {
            continue;
        };
        let identifier = allocator.allocate(filename);
        imports.push(codegen::import_statement(
            config.module_system,
            &identifier,
            &import_path(file, out_dir),
        ));
        by_variant.entry(variant_id).or_default().push(identifier);
    }

    let mut variants: Vec<_> = by_variant.into_iter().collect();
    // `base` first, the rest alphabetically.
    variants.sort_by_key(|(variant, _)| (*variant != BASE_VARIANT, *variant));

    let mut source = String::from(GENERATED_HEADER);
    source.push('\n');
    for import in &imports {
        source.push_str(import);
        source.push('\n');
    }
    if !imports.is_empty() {
        source.push('\n');
    }

    source.push_str(codegen::export_open(config.module_system));
    source.push('\n');
    for (variant, identifiers) in &variants {
        source.push_str(&format!("{}{}: {{\n", codegen::indent(1), codegen::object_key(variant)));
        for identifier in identifiers {
            source.push_str(&format!("{}...{},\n", codegen::indent(2), identifier));
        }
        source.push_str(&format!("{}}},\n", codegen::indent(1)));
    }
    source.push_str("};\n");

    tracing::debug!(
        framework = %config.framework,
        files = imports.len(),
        variants = variants.len(),
        "generated framework driver"
    );

    OutputFile::new(
        DRIVER_FILENAME,
        out_dir,
        if config.typescript { "ts" } else { "js" },
        FileContent::Text(source),
        None,
    )
}

/// Runs the framework post-pass over an output's files and appends the driver.
pub fn apply_framework(files: &mut Vec<OutputFile>, config: &FrameworkConfig, out_dir: &Path) {
    if config.framework == Framework::VueI18n {
        rewrite_interpolation(files);
    }

    let json_files: BTreeMap<String, &OutputFile> = files
        .iter()
        .filter(|file| matches!(file.content, FileContent::Json(_)))
        .map(|file| (file.full_filename(), file))
        .collect();
    let driver = generate(&json_files, config, out_dir);
    files.push(driver);
}

/// `./`-relative import path from the driver to `file`.
fn import_path(file: &OutputFile, out_dir: &Path) -> String {
    let path = file.path();
    let relative = path
        .strip_prefix(out_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(file.full_filename()));
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("./{}", relative)
}
