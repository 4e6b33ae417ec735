use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(windows)]
const DEFAULT_PROGRAM: &str = "php.exe";
#[cfg(not(windows))]
const DEFAULT_PROGRAM: &str = "php";

/// The external program test files are run with.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: PathBuf,
}

impl Interpreter {
    /// Use the explicitly configured executable, or fall back to the
    /// platform default resolved through PATH.
    pub fn resolve(configured: Option<PathBuf>) -> Self {
        Interpreter {
            program: configured.unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
        }
    }

    pub fn command(&self, test_file: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(test_file);
        cmd
    }

    /// Check that the interpreter can actually be started.
    pub fn is_installed(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn installation_tip(&self) -> String {
        format!(
            "pass '{}' to point at an existing executable",
            "--phpcli <PATH>".bold().yellow()
        )
    }

    pub fn name(&self) -> String {
        self.program.display().to_string()
    }
}
