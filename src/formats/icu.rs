//! ICU message format JSON, rendered by the export endpoint as a flat key/value map.

use std::path::{Path, PathBuf};

use crate::formats::FormatStrategy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcuStrategy {
    out_dir: PathBuf,
}

impl IcuStrategy {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        IcuStrategy {
            out_dir: out_dir.into(),
        }
    }
}

impl FormatStrategy for IcuStrategy {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn export_format_id(&self) -> Option<&'static str> {
        Some("json_icu")
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
