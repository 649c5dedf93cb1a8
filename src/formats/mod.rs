//! All supported output formats for textsync.
//!
//! Every format shares one pipeline. The per-format differences are captured by
//! [`FormatStrategy`]: where a file goes, which extension it carries, and which
//! export id the server renders it with.

pub mod android;
pub mod export;
pub mod icu;
pub mod ios;
pub mod json;
pub mod swift;

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::{
    config::{Output, ProjectConfig},
    error::Error,
    types::{FileContent, OutputFile, file_key},
};

pub use android::AndroidStrategy;
pub use icu::IcuStrategy;
pub use ios::{IosFlavor, IosStrategy};
pub use json::JsonStrategy;

/// Name of the shared variables file, without extension.
pub const VARIABLES_FILENAME: &str = "variables";

/// Represents all supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "ios-strings")]
    IosStrings,
    #[serde(rename = "ios-stringsdict")]
    IosStringsdict,
    #[serde(rename = "json_icu")]
    JsonIcu,
    #[serde(rename = "ios-swift")]
    Swift,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Android => write!(f, "android"),
            OutputFormat::IosStrings => write!(f, "ios-strings"),
            OutputFormat::IosStringsdict => write!(f, "ios-stringsdict"),
            OutputFormat::JsonIcu => write!(f, "json_icu"),
            OutputFormat::Swift => write!(f, "ios-swift"),
        }
    }
}

/// Accepts the same names as the configuration, case-insensitively.
///
/// ```rust
/// use textsync::formats::OutputFormat;
/// use std::str::FromStr;
/// assert_eq!(OutputFormat::from_str("android").unwrap(), OutputFormat::Android);
/// assert_eq!(OutputFormat::from_str("ios-strings").unwrap(), OutputFormat::IosStrings);
/// assert!(OutputFormat::from_str("yaml").is_err());
/// ```
impl FromStr for OutputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "json" => Ok(OutputFormat::Json),
            "android" => Ok(OutputFormat::Android),
            "ios-strings" => Ok(OutputFormat::IosStrings),
            "ios-stringsdict" => Ok(OutputFormat::IosStringsdict),
            "json_icu" => Ok(OutputFormat::JsonIcu),
            "ios-swift" => Ok(OutputFormat::Swift),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl OutputFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::JsonIcu => "json",
            OutputFormat::Android => "xml",
            OutputFormat::IosStrings => "strings",
            OutputFormat::IosStringsdict => "stringsdict",
            OutputFormat::Swift => "swift",
        }
    }

    /// Whether the server renders this format through the export endpoints.
    pub fn is_export(&self) -> bool {
        matches!(
            self,
            OutputFormat::Android
                | OutputFormat::IosStrings
                | OutputFormat::IosStringsdict
                | OutputFormat::JsonIcu
        )
    }

    /// Framework drivers can only re-export JSON files.
    pub fn supports_framework(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonIcu)
    }
}

/// Per-format behaviour plugged into the shared transform pipeline.
pub trait FormatStrategy: Send + Sync {
    fn extension(&self) -> &'static str;

    /// Format id sent to the export endpoints; `None` for structured formats.
    fn export_format_id(&self) -> Option<&'static str>;

    /// Directory of every file whose location does not depend on its variant.
    fn out_dir(&self) -> &Path;

    /// Directory a file for `variant_id` is written into.
    fn directory_for(&self, _variant_id: &str) -> PathBuf {
        self.out_dir().to_path_buf()
    }

    /// Creates the file for `{prefix}___{variant_id}`.
    fn create_output_file(&self, prefix: &str, variant_id: &str, content: FileContent) -> OutputFile {
        OutputFile::new(
            file_key(prefix, Some(variant_id)),
            self.directory_for(variant_id),
            self.extension(),
            content,
            Some(variant_id.to_string()),
        )
    }
}

/// Builds the strategy for one output.
pub fn strategy_for(
    config: &ProjectConfig,
    output: &Output,
) -> Result<Box<dyn FormatStrategy>, Error> {
    let out_dir = output.out_dir();
    let strategy: Box<dyn FormatStrategy> = match output.format {
        OutputFormat::Json => Box::new(JsonStrategy::new(out_dir)),
        OutputFormat::Android => Box::new(AndroidStrategy::new(out_dir)),
        OutputFormat::JsonIcu => Box::new(IcuStrategy::new(out_dir)),
        OutputFormat::IosStrings | OutputFormat::IosStringsdict => {
            let flavor = if output.format == OutputFormat::IosStrings {
                IosFlavor::Strings
            } else {
                IosFlavor::Stringsdict
            };
            let locales = output.ios_locales.as_ref().or(config.ios_locales.as_ref());
            Box::new(IosStrategy::new(out_dir, flavor, locales))
        }
        OutputFormat::Swift => {
            return Err(Error::UnsupportedFormat(
                "ios-swift files are generated by the Swift driver, not a file strategy"
                    .to_string(),
            ));
        }
    };
    Ok(strategy)
}

/// Files produced for one output, keyed by `{prefix}___{variant}`.
///
/// A key is created once; later content for the same key goes into the existing file.
pub struct OutputSet<'a> {
    strategy: &'a dyn FormatStrategy,
    files: BTreeMap<String, OutputFile>,
}

impl<'a> OutputSet<'a> {
    pub fn new(strategy: &'a dyn FormatStrategy) -> Self {
        OutputSet {
            strategy,
            files: BTreeMap::new(),
        }
    }

    /// Returns the file for `(prefix, variant_id)`, creating it with `content` if absent.
    pub fn get_or_create(
        &mut self,
        prefix: &str,
        variant_id: &str,
        content: impl FnOnce() -> FileContent,
    ) -> &mut OutputFile {
        self.files
            .entry(file_key(prefix, Some(variant_id)))
            .or_insert_with(|| self.strategy.create_output_file(prefix, variant_id, content()))
    }

    /// Adds a file that is not keyed by source and variant, such as `variables.json`.
    pub fn insert_shared(&mut self, file: OutputFile) {
        self.files.insert(file.filename.clone(), file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<OutputFile> {
        self.files.into_values().collect()
    }
}

/// Builds the shared `variables.json` file.
pub fn variables_file(out_dir: &Path, content: serde_json::Map<String, serde_json::Value>) -> OutputFile {
    OutputFile::new(
        VARIABLES_FILENAME,
        out_dir,
        "json",
        FileContent::Json(content),
        None,
    )
}
