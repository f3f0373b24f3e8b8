//! Advisory single-writer lock for a target directory.

use crate::error::{OrganizeError, OrganizeResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File name of the lock, created inside the `Logs` directory.
pub const LOCK_FILE_NAME: &str = ".typesort.lock";

/// Held for the duration of an organize or undo run; the lock file is
/// removed when the guard is dropped.
#[derive(Debug)]
pub struct DirectoryLock {
    path: PathBuf,
}

impl DirectoryLock {
    /// Creates the lock file in `logs_dir`, which must already exist.
    ///
    /// Fails with [`OrganizeError::DirectoryLocked`] if the file is already
    /// present.
    pub fn acquire(logs_dir: &Path) -> OrganizeResult<Self> {
        let path = logs_dir.join(LOCK_FILE_NAME);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Informational only; nobody reads the pid back.
                let _ = writeln!(file, "{}", std::process::id());
                log::debug!("Acquired lock {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(OrganizeError::DirectoryLocked { lock_path: path })
            }
            Err(source) => Err(OrganizeError::LogWriteFailed { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Could not remove lock file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_exclusive_and_released_on_drop() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let logs_dir = temp_dir.path();

        let lock = DirectoryLock::acquire(logs_dir).expect("Failed to acquire lock");
        assert!(lock.path().exists());

        let second = DirectoryLock::acquire(logs_dir);
        assert!(matches!(second, Err(OrganizeError::DirectoryLocked { .. })));

        drop(lock);
        assert!(!logs_dir.join(LOCK_FILE_NAME).exists());
        assert!(DirectoryLock::acquire(logs_dir).is_ok());
    }

    #[test]
    fn test_lock_in_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = DirectoryLock::acquire(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(OrganizeError::LogWriteFailed { .. })));
    }
}
