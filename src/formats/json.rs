//! Structured JSON output.
//!
//! Text items and components are grouped into one flat JSON object per
//! `{prefix}___{variant}` key, and every variable they reference is copied into
//! the shared `variables.json`.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{
    error::Error,
    fetch::{StructuredContent, VariableIndex},
    formats::{FormatStrategy, OutputSet, variables_file},
    types::{BASE_VARIANT, FileContent, OutputFile, TextEntity},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStrategy {
    out_dir: PathBuf,
}

impl JsonStrategy {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        JsonStrategy {
            out_dir: out_dir.into(),
        }
    }
}

impl FormatStrategy for JsonStrategy {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn export_format_id(&self) -> Option<&'static str> {
        None
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

/// Picks rich text over plain text when it is enabled and the entity has one.
pub fn select_value<E: TextEntity + ?Sized>(entity: &E, rich_text_enabled: bool) -> &str {
    match entity.rich_text() {
        Some(rich) if rich_text_enabled => rich,
        _ => entity.text(),
    }
}

/// Turns fetched entities into JSON files plus `variables.json`.
pub fn transform(
    content: &StructuredContent,
    strategy: &dyn FormatStrategy,
    rich_text_enabled: bool,
) -> Result<Vec<OutputFile>, Error> {
    let mut set = OutputSet::new(strategy);
    let mut variables = Map::new();

    let entities = content
        .text_items
        .iter()
        .map(|item| item as &dyn TextEntity)
        .chain(content.components.iter().map(|c| c as &dyn TextEntity));

    for entity in entities {
        let variant_id = entity.variant_id().unwrap_or(BASE_VARIANT);
        let file = set.get_or_create(entity.file_prefix(), variant_id, || {
            FileContent::Json(Map::new())
        });
        if let Some(json) = file.json_mut() {
            json.insert(
                entity.content_key(),
                Value::String(select_value(entity, rich_text_enabled).to_string()),
            );
        }

        collect_variables(entity.variable_ids(), &content.variables, &mut variables)?;
    }

    set.insert_shared(variables_file(strategy.out_dir(), variables));
    Ok(set.into_files())
}

/// Copies the data of every referenced variable, keyed by id.
pub(crate) fn collect_variables(
    ids: &[String],
    index: &VariableIndex,
    into: &mut Map<String, Value>,
) -> Result<(), Error> {
    for id in ids {
        match index.get(id) {
            Some(variable) => {
                into.insert(id.clone(), variable.data.to_value()?);
            }
            None => tracing::warn!(variable = %id, "referenced variable was not returned by the API"),
        }
    }
    Ok(())
}
