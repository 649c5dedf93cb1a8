//! Android `strings.xml` resources, rendered by the export endpoint.

use std::path::{Path, PathBuf};

use crate::formats::FormatStrategy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidStrategy {
    out_dir: PathBuf,
}

impl AndroidStrategy {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        AndroidStrategy {
            out_dir: out_dir.into(),
        }
    }
}

impl FormatStrategy for AndroidStrategy {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn export_format_id(&self) -> Option<&'static str> {
        Some("android")
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
