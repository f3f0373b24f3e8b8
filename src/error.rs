//! Error types shared by the organizer, the undo engine and the log files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while organizing a directory or undoing a run.
#[derive(Error, Debug)]
pub enum OrganizeError {
    /// The target directory is missing or is not a directory.
    #[error("Invalid base path {}: {source}", .path.display())]
    InvalidBasePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a category or `Logs` directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a file.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or delete a log file.
    #[error("Failed to write log file {}: {source}", .path.display())]
    LogWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a log file or the `Logs` directory.
    #[error("Failed to read log file {}: {source}", .path.display())]
    LogReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operation log is not a flat JSON object of strings.
    #[error("Invalid operation log {}: {reason}", .path.display())]
    InvalidLogFormat { path: PathBuf, reason: String },

    /// Undo was requested but nothing has been recorded.
    #[error("No operation log found in {}. Cannot undo changes.", .logs_dir.display())]
    NoOperationLog { logs_dir: PathBuf },

    /// Another organize or undo run holds the directory lock.
    #[error(
        "Directory is locked by another run ({}). Remove the lock file if no run is in progress.",
        .lock_path.display()
    )]
    DirectoryLocked { lock_path: PathBuf },

    /// The filter configuration could not be loaded or compiled.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type for organize and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

impl OrganizeError {
    /// Builds an `InvalidBasePath` error when `path` is not an existing directory.
    pub(crate) fn check_base_path(path: &std::path::Path) -> OrganizeResult<()> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(OrganizeError::InvalidBasePath {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "base path is not a directory",
                ),
            }),
            Err(source) => Err(OrganizeError::InvalidBasePath {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Returns a short title for the notification shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            OrganizeError::InvalidBasePath { .. } => "Invalid Folder",
            OrganizeError::NoOperationLog { .. } | OrganizeError::InvalidLogFormat { .. } => {
                "Undo Error"
            }
            OrganizeError::LogWriteFailed { .. } | OrganizeError::LogReadFailed { .. } => {
                "Log Error"
            }
            OrganizeError::DirectoryLocked { .. } => "Directory Busy",
            OrganizeError::Config(_) => "Configuration Error",
            OrganizeError::DirectoryCreationFailed { .. }
            | OrganizeError::FileMoveFailure { .. } => "File Organization Error",
        }
    }
}
