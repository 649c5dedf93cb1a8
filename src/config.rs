//! Project configuration consumed by the pipeline.
//!
//! The configuration arrives already parsed (for example from a YAML file read by
//! the caller); this module only gives it a typed shape and checks the semantic
//! rules the pipeline relies on.

use std::{
    collections::{BTreeMap, HashSet},
    fmt::{Display, Formatter},
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Deserializer};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    formats::OutputFormat,
    types::{IdRef, Status},
};

/// Directory used when an output does not set `outDir`.
pub const DEFAULT_OUT_DIR: &str = "./textsync";

/// The only rich text rendition the API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RichTextFormat {
    Html,
}

/// `richText` accepts `"html"` to enable rich text or `false` to disable it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichText {
    Html,
    Disabled,
}

impl RichText {
    pub fn is_enabled(self) -> bool {
        self == RichText::Html
    }
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Format(RichTextFormat),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Format(RichTextFormat::Html) => Ok(RichText::Html),
            Raw::Flag(false) => Ok(RichText::Disabled),
            Raw::Flag(true) => Err(serde::de::Error::custom(
                "richText must be \"html\" or false",
            )),
        }
    }
}

/// Supported framework drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Framework {
    #[serde(rename = "i18next")]
    I18next,
    #[serde(rename = "vue-i18n")]
    VueI18n,
}

impl Framework {
    /// The module system a framework's driver uses unless overridden.
    pub fn default_module_system(self) -> ModuleSystem {
        match self {
            Framework::I18next => ModuleSystem::Module,
            Framework::VueI18n => ModuleSystem::Commonjs,
        }
    }
}

impl Display for Framework {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Framework::I18next => write!(f, "i18next"),
            Framework::VueI18n => write!(f, "vue-i18n"),
        }
    }
}

/// `import`/`export` or `require`/`module.exports`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSystem {
    Module,
    Commonjs,
}

/// Framework driver settings of one output.
///
/// Accepts either a bare framework name or an object with overrides:
///
/// ```rust
/// use textsync::config::{Framework, FrameworkConfig, ModuleSystem};
/// let short: FrameworkConfig = serde_json::from_str(r#""i18next""#).unwrap();
/// assert_eq!(short.framework, Framework::I18next);
/// assert_eq!(short.module_system, ModuleSystem::Module);
///
/// let long: FrameworkConfig =
///     serde_json::from_str(r#"{"framework": "i18next", "type": "commonjs", "typescript": true}"#).unwrap();
/// assert_eq!(long.module_system, ModuleSystem::Commonjs);
/// assert!(long.typescript);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFramework")]
pub struct FrameworkConfig {
    pub framework: Framework,
    pub module_system: ModuleSystem,
    pub typescript: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFramework {
    Name(Framework),
    Detailed {
        framework: Framework,
        #[serde(rename = "type")]
        #[serde(default)]
        module_system: Option<ModuleSystem>,
        #[serde(default)]
        typescript: bool,
    },
}

impl From<RawFramework> for FrameworkConfig {
    fn from(raw: RawFramework) -> Self {
        match raw {
            RawFramework::Name(framework) => FrameworkConfig::new(framework),
            RawFramework::Detailed {
                framework,
                module_system,
                typescript,
            } => FrameworkConfig {
                framework,
                module_system: module_system.unwrap_or(framework.default_module_system()),
                typescript,
            },
        }
    }
}

impl FrameworkConfig {
    pub fn new(framework: Framework) -> Self {
        FrameworkConfig {
            framework,
            module_system: framework.default_module_system(),
            typescript: false,
        }
    }
}

/// `components` section of the project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsConfig {
    #[serde(default)]
    pub folders: Option<Vec<IdRef>>,
}

/// Variant id to locale code mapping, written as a list of single-entry maps:
/// `[{base: "en"}, {fr: "fr-FR"}]`.
pub type IosLocales = Vec<BTreeMap<String, String>>;

/// One configured destination with its own format and filter overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub format: OutputFormat,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub framework: Option<FrameworkConfig>,
    #[serde(default)]
    pub projects: Option<Vec<IdRef>>,
    #[serde(default)]
    pub variants: Option<Vec<IdRef>>,
    #[serde(default)]
    pub folders: Option<Vec<IdRef>>,
    #[serde(default)]
    pub statuses: Option<Vec<Status>>,
    #[serde(default)]
    pub rich_text: Option<RichText>,
    #[serde(default)]
    pub ios_locales: Option<IosLocales>,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Output {
            format,
            out_dir: None,
            framework: None,
            projects: None,
            variants: None,
            folders: None,
            statuses: None,
            rich_text: None,
            ios_locales: None,
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }
}

/// The whole project configuration: shared filters plus one or more outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub projects: Option<Vec<IdRef>>,
    #[serde(default)]
    pub variants: Option<Vec<IdRef>>,
    #[serde(default)]
    pub components: Option<ComponentsConfig>,
    #[serde(default)]
    pub statuses: Option<Vec<Status>>,
    #[serde(default)]
    pub rich_text: Option<RichText>,
    #[serde(default)]
    pub ios_locales: Option<IosLocales>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl ProjectConfig {
    /// Builds a configuration from an already-parsed value and validates it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        let config: ProjectConfig = serde_json::from_value(value)
            .map_err(|e| Error::configuration(format!("invalid project config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Folders configured at the project level, if a `components` section exists.
    pub fn folders(&self) -> Option<&Vec<IdRef>> {
        self.components.as_ref().and_then(|c| c.folders.as_ref())
    }

    /// Checks the semantic rules the pipeline relies on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.outputs.is_empty() {
            return Err(Error::configuration("at least one output is required"));
        }

        if let Some(locales) = &self.ios_locales {
            validate_ios_locales(locales)?;
        }

        for (index, output) in self.outputs.iter().enumerate() {
            if let Some(framework) = &output.framework {
                if !output.format.supports_framework() {
                    return Err(Error::configuration(format!(
                        "outputs[{}]: framework `{}` requires a JSON format, found `{}`",
                        index, framework.framework, output.format
                    )));
                }
            }
            if let Some(locales) = &output.ios_locales {
                validate_ios_locales(locales)?;
            }
            for (field, refs) in [
                ("projects", &output.projects),
                ("variants", &output.variants),
                ("folders", &output.folders),
            ] {
                if refs.iter().flatten().any(|r| r.id.trim().is_empty()) {
                    return Err(Error::configuration(format!(
                        "outputs[{}]: {} entries must have a non-empty id",
                        index, field
                    )));
                }
            }
        }

        Ok(())
    }
}

impl FromStr for ProjectConfig {
    type Err = Error;

    /// Parses a JSON document. YAML loading is left to the caller.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| Error::configuration(format!("invalid project config: {}", e)))?;
        ProjectConfig::from_value(value)
    }
}

fn validate_ios_locales(locales: &IosLocales) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for (variant_id, locale) in locales.iter().flatten() {
        if !seen.insert(variant_id) {
            return Err(Error::configuration(format!(
                "iosLocales maps variant `{}` more than once",
                variant_id
            )));
        }
        locale.parse::<LanguageIdentifier>().map_err(|e| {
            Error::configuration(format!(
                "iosLocales: `{}` is not a valid locale for variant `{}`: {}",
                locale, variant_id, e
            ))
        })?;
    }
    Ok(())
}
