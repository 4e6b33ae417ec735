use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

use crate::format;

#[derive(Debug)]
pub enum AppError {
    InterpreterNotInstalled {
        program: String,
        installation_tip: String,
    },
    NoTestFiles {
        root: PathBuf,
    },
    DiscoveryFailed {
        root: PathBuf,
        reason: String,
    },
    OutputDirUndetermined {
        path: PathBuf,
    },
    OutputNotWritable {
        path: PathBuf,
    },
    CommandFailed {
        command: String,
        reason: String,
    },
    ReportWriteFailed {
        path: PathBuf,
        reason: String,
    },
    Other(anyhow::Error),
}

// Implement Display for uncolored error messages (for logging, etc.)
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InterpreterNotInstalled { program, .. } => {
                write!(f, "interpreter '{}' is not installed", program)
            }
            AppError::NoTestFiles { root } => {
                write!(f, "no test files found under: {}", root.display())
            }
            AppError::DiscoveryFailed { root, reason } => {
                write!(
                    f,
                    "failed to walk test directory '{}': {}",
                    root.display(),
                    reason
                )
            }
            AppError::OutputDirUndetermined { path } => {
                write!(
                    f,
                    "the target folder for '{}' could not be determined",
                    path.display()
                )
            }
            AppError::OutputNotWritable { path } => {
                write!(f, "'{}' can not be written to", path.display())
            }
            AppError::CommandFailed { command, reason } => {
                write!(f, "command '{}' failed: {}", command, reason)
            }
            AppError::ReportWriteFailed { path, reason } => {
                write!(
                    f,
                    "failed to write report to '{}': {}",
                    path.display(),
                    reason
                )
            }
            AppError::Other(err) => {
                write!(f, "{}", err)
            }
        }
    }
}

// Map error types to exit codes and provide colorized output
impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InterpreterNotInstalled { .. } => 10,
            AppError::NoTestFiles { .. } => 20,
            AppError::DiscoveryFailed { .. } => 30,
            AppError::OutputDirUndetermined { .. } => 40,
            AppError::OutputNotWritable { .. } => 50,
            AppError::CommandFailed { .. } => 60,
            AppError::ReportWriteFailed { .. } => 70,
            AppError::Other(_) => 1,
        }
    }

    // Create a colored version of the error message
    fn colorized_message(&self) -> String {
        match self {
            AppError::InterpreterNotInstalled { program, .. } => {
                format!(
                    "interpreter '{}' is not installed",
                    program.bold().yellow()
                )
            }

            AppError::NoTestFiles { root } => {
                format!(
                    "no test files found under: {}",
                    root.display().to_string().bold().yellow()
                )
            }

            AppError::DiscoveryFailed { root, reason } => {
                format!(
                    "failed to walk test directory '{}': {}",
                    root.display().to_string().bold().yellow(),
                    reason.bold()
                )
            }

            AppError::OutputDirUndetermined { path } => {
                format!(
                    "the target folder for '{}' could not be determined",
                    path.display().to_string().bold().yellow()
                )
            }

            AppError::OutputNotWritable { path } => {
                format!(
                    "'{}' can not be written to",
                    path.display().to_string().bold().yellow()
                )
            }

            AppError::CommandFailed { command, reason } => {
                format!(
                    "command '{}' failed: {}",
                    command.bold().yellow(),
                    reason.bold()
                )
            }

            AppError::ReportWriteFailed { path, reason } => {
                format!(
                    "failed to write report to '{}': {}",
                    path.display().to_string().bold().yellow(),
                    reason.bold()
                )
            }

            AppError::Other(err) => {
                format!("{}", err)
            }
        }
    }

    // Handle printing the error and any additional context
    pub fn report(&self) {
        format::error!(self.colorized_message());

        // Add additional context for specific error types
        match self {
            AppError::InterpreterNotInstalled {
                installation_tip, ..
            } => {
                println!();
                format::tip!(installation_tip);
            }
            _ => {}
        }
    }
}

// Implement conversion from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Other(err)
    }
}
