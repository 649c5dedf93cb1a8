//! Core types for textsync.
//! Fetchers decode API responses into these; formatters turn them into [`OutputFile`]s.

use std::{
    collections::BTreeMap,
    fmt::Display,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Variant id used for files holding entities without a variant.
pub const BASE_VARIANT: &str = "base";

/// Prefix used for files generated from the component library.
pub const COMPONENTS_PREFIX: &str = "components";

/// Review status of a text item or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    None,
    Wip,
    Review,
    Final,
}

/// A reference to a project, variant, or folder by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdRef {
    pub id: String,

    /// Only meaningful for folders: skip content of nested folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub exclude_nested_folders: Option<bool>,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        IdRef {
            id: id.into(),
            exclude_nested_folders: None,
        }
    }

    pub fn base() -> Self {
        IdRef::new(BASE_VARIANT)
    }

    pub fn is_all(&self) -> bool {
        self.id == "all"
    }
}

/// A string belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub rich_text: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variable_ids: Vec<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub plural_form: Option<String>,
    pub project_id: String,
}

/// A reusable string from the component library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub rich_text: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variable_ids: Vec<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub plural_form: Option<String>,
    /// `None` for components living in the library root.
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// Shared view over text items and components used by the structured formatter.
pub trait TextEntity {
    fn id(&self) -> &str;
    fn text(&self) -> &str;
    fn rich_text(&self) -> Option<&str>;
    fn variant_id(&self) -> Option<&str>;
    fn variable_ids(&self) -> &[String];

    /// Prefix of the file this entity is written into.
    fn file_prefix(&self) -> &str;

    /// Key of this entity inside its file.
    fn content_key(&self) -> String {
        self.id().to_string()
    }

    /// `{prefix}___{variantId|base}`
    fn file_key(&self) -> String {
        file_key(self.file_prefix(), self.variant_id())
    }
}

impl TextEntity for TextItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn rich_text(&self) -> Option<&str> {
        self.rich_text.as_deref()
    }

    fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    fn variable_ids(&self) -> &[String] {
        &self.variable_ids
    }

    fn file_prefix(&self) -> &str {
        &self.project_id
    }

    /// Plural forms of one string live side by side as `{id}_{form}`.
    fn content_key(&self) -> String {
        match &self.plural_form {
            Some(form) => format!("{}_{}", self.id, form),
            None => self.id.clone(),
        }
    }
}

impl TextEntity for Component {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn rich_text(&self) -> Option<&str> {
        self.rich_text.as_deref()
    }

    fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    fn variable_ids(&self) -> &[String] {
        &self.variable_ids
    }

    fn file_prefix(&self) -> &str {
        COMPONENTS_PREFIX
    }
}

/// Builds the file key shared by every format: `{prefix}___{variantId|base}`.
pub fn file_key(prefix: &str, variant_id: Option<&str>) -> String {
    format!("{}___{}", prefix, variant_id.unwrap_or(BASE_VARIANT))
}

/// Example/fallback pair used by string and number variables.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScalarVariable<T> {
    pub example: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HyperlinkVariable {
    pub text: String,
    pub url: String,
}

/// Typed payload of a [`Variable`]; the `type` tag selects the shape of `data`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum VariableData {
    String(ScalarVariable<String>),
    Number(ScalarVariable<serde_json::Number>),
    Hyperlink(HyperlinkVariable),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl VariableData {
    /// The `data` part only, as it is written into `variables.json`.
    pub fn to_value(&self) -> Result<Value, Error> {
        let value = match self {
            VariableData::String(data) => serde_json::to_value(data)?,
            VariableData::Number(data) => serde_json::to_value(data)?,
            VariableData::Hyperlink(data) => serde_json::to_value(data)?,
            VariableData::List(data) => serde_json::to_value(data)?,
            VariableData::Map(data) => serde_json::to_value(data)?,
        };
        Ok(value)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            VariableData::String(_) => "string",
            VariableData::Number(_) => "number",
            VariableData::Hyperlink(_) => "hyperlink",
            VariableData::List(_) => "list",
            VariableData::Map(_) => "map",
        }
    }
}

/// A named, typed placeholder interpolated into text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub data: VariableData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Variant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of an export call: either a rendered document or a flat key/value map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExportPayload {
    Map(BTreeMap<String, String>),
    Text(String),
}

/// Body of a generated file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Json(Map<String, Value>),
    Text(String),
}

impl FileContent {
    /// Renders the content as it is written to disk.
    pub fn render(&self) -> Result<String, Error> {
        match self {
            FileContent::Json(map) => Ok(serde_json::to_string_pretty(map)?),
            FileContent::Text(text) => Ok(text.clone()),
        }
    }
}

impl From<ExportPayload> for FileContent {
    fn from(payload: ExportPayload) -> Self {
        match payload {
            ExportPayload::Map(map) => FileContent::Json(
                map.into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ),
            ExportPayload::Text(text) => FileContent::Text(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFileMetadata {
    /// `None` for files that do not belong to a variant, like `variables.json`.
    pub variant_id: Option<String>,
}

/// One file produced by a pipeline run, held in memory until it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    /// File name without extension.
    pub filename: String,
    pub directory: PathBuf,
    pub extension: String,
    pub content: FileContent,
    pub metadata: OutputFileMetadata,
}

impl OutputFile {
    pub fn new(
        filename: impl Into<String>,
        directory: impl Into<PathBuf>,
        extension: impl Into<String>,
        content: FileContent,
        variant_id: Option<String>,
    ) -> Self {
        OutputFile {
            filename: filename.into(),
            directory: directory.into(),
            extension: extension.into(),
            content,
            metadata: OutputFileMetadata { variant_id },
        }
    }

    /// `{filename}.{extension}`
    pub fn full_filename(&self) -> String {
        format!("{}.{}", self.filename, self.extension)
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(self.full_filename())
    }

    /// Mutable access to the JSON body, if this is a JSON file.
    pub fn json_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match &mut self.content {
            FileContent::Json(map) => Some(map),
            FileContent::Text(_) => None,
        }
    }
}

impl Display for OutputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OutputFile {{ path: {}, variant: {} }}",
            self.path().display(),
            self.metadata.variant_id.as_deref().unwrap_or("-")
        )
    }
}
