use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::testing::run::TestRun;

mod serialize;

pub use serialize::SerializeError;

/// Collects finished test runs and writes them out as one XUnit document.
pub struct XunitReport {
    output_path: PathBuf,
    runs: Vec<TestRun>,
    strict_write: bool,
}

impl XunitReport {
    pub fn new(output_path: impl Into<PathBuf>, strict_write: bool) -> Self {
        XunitReport {
            output_path: output_path.into(),
            runs: Vec::new(),
            strict_write,
        }
    }

    /// Append a finished run. Suite order in the document follows insertion
    /// order.
    pub fn add_run(&mut self, run: TestRun) {
        self.runs.push(run);
    }

    /// Render the document. Rendering is a pure function of the runs added
    /// so far, so repeated calls produce identical output.
    pub fn render(&self) -> Result<String, SerializeError> {
        serialize::render_document(&self.runs)
    }

    /// Validate the output path, render the document, and write it.
    ///
    /// Path problems found up front are fatal configuration errors. The
    /// write itself is best-effort: a failure after the checks passed is
    /// swallowed unless strict mode is on.
    pub fn write(&self) -> Result<(), AppError> {
        self.check_output_path()?;

        let document = self
            .render()
            .map_err(|e| AppError::Other(anyhow::Error::new(e)))?;

        match fs::write(&self.output_path, document) {
            Ok(()) => Ok(()),
            Err(e) if self.strict_write => Err(AppError::ReportWriteFailed {
                path: self.output_path.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(()),
        }
    }

    fn check_output_path(&self) -> Result<(), AppError> {
        if self.output_path.exists() {
            if is_read_only(&self.output_path) {
                return Err(AppError::OutputNotWritable {
                    path: self.output_path.clone(),
                });
            }
            return Ok(());
        }

        let parent = match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(AppError::OutputDirUndetermined {
                    path: self.output_path.clone(),
                });
            }
        };

        if !parent.is_dir() {
            return Err(AppError::OutputDirUndetermined {
                path: self.output_path.clone(),
            });
        }
        if is_read_only(&parent) {
            return Err(AppError::OutputNotWritable { path: parent });
        }

        Ok(())
    }
}

fn is_read_only(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.permissions().readonly())
        .unwrap_or(true)
}
