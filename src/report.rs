//! Report assembly and file output.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Collects report text as it arrives and optionally mirrors it to a file.
///
/// The output file is opened before any research is submitted, so an
/// unwritable path fails the run immediately instead of after an hour of
/// work. Every appended delta is flushed, which keeps the file current
/// with everything received if the process dies mid-run.
#[derive(Debug)]
pub struct ReportWriter {
    text: String,
    output: Option<(PathBuf, File)>,
}

impl ReportWriter {
    /// Writer that only accumulates in memory.
    pub fn in_memory() -> Self {
        Self {
            text: String::new(),
            output: None,
        }
    }

    /// Writer that also mirrors the report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] naming the path when the file cannot be
    /// created.
    pub fn to_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| Error::write_failed(&path, e))?;

        Ok(Self {
            text: String::new(),
            output: Some((path, file)),
        })
    }

    /// Append one piece of report text.
    pub fn push(&mut self, delta: &str) -> Result<()> {
        self.text.push_str(delta);
        if let Some((path, file)) = self.output.as_mut() {
            file.write_all(delta.as_bytes())
                .and_then(|()| file.flush())
                .map_err(|e| Error::write_failed(&path, e))?;
        }
        Ok(())
    }

    /// The report text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether any report text has been received.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The output path, when writing to a file.
    pub fn path(&self) -> Option<&Path> {
        self.output.as_ref().map(|(path, _)| path.as_path())
    }
}
