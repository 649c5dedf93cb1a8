//! Persisting generated files.

use std::{fs, path::Path};

use crate::{error::Error, types::OutputFile};

/// Destination for rendered files.
pub trait FileWriter: Send + Sync {
    /// Writes `content` to `path`, creating parent directories and replacing any
    /// existing file. A trailing newline is added when missing.
    fn write_file(&self, path: &Path, content: &str) -> Result<(), Error>;

    /// Renders and writes one output file.
    fn write_output(&self, file: &OutputFile) -> Result<(), Error> {
        let content = file.content.render()?;
        self.write_file(&file.path(), &content)
    }
}

/// Writes to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl FileWriter for FsWriter {
    fn write_file(&self, path: &Path, content: &str) -> Result<(), Error> {
        let to_write_error = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(to_write_error)?;
        }
        fs::write(path, with_trailing_newline(content).as_bytes()).map_err(to_write_error)
    }
}

/// Appends `\n` unless `content` already ends with one.
pub fn with_trailing_newline(content: &str) -> std::borrow::Cow<'_, str> {
    if content.ends_with('\n') {
        content.into()
    } else {
        format!("{}\n", content).into()
    }
}
