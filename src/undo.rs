/// Undo functionality for reverting file organization operations.
///
/// This module moves files back to their original locations based on the
/// most recent operation log, deletes that log, and removes the category
/// folders the run left empty.
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_category::all_categories;
use crate::lock::DirectoryLock;
use crate::operation_log::{OperationLog, find_latest_operation_log, logs_dir};
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the result of an undo operation.
#[derive(Debug)]
pub struct UndoReport {
    /// The operation log that was consumed.
    pub log_path: PathBuf,
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that failed to restore, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files that were skipped because they are no longer where the log says.
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Empty category folders that were removed.
    pub removed_folders: Vec<PathBuf>,
    /// Category folders that were empty but could not be removed.
    pub folder_errors: Vec<(PathBuf, String)>,
}

impl UndoReport {
    fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            restored_files: 0,
            failed_restores: Vec::new(),
            skipped_files: Vec::new(),
            removed_folders: Vec::new(),
            folder_errors: Vec::new(),
        }
    }

    /// Returns the total number of log entries processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every logged file was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Manages undo operations for file organization.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent organize run of `base_path`.
    ///
    /// Undo is best effort: entries whose file has gone missing are skipped
    /// and entries that fail to move are reported, but neither stops the run.
    /// The consumed log is deleted in every case, so a later undo moves on to
    /// the previous log instead of retrying these entries.
    ///
    /// # Errors
    ///
    /// Returns an error, without changing anything, if `base_path` is not a
    /// directory, another run holds the lock, no operation log exists, or the
    /// newest log cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use typesort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/path/to/downloads")) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(base_path: &Path) -> OrganizeResult<UndoReport> {
        OrganizeError::check_base_path(base_path)?;

        let logs = logs_dir(base_path);
        if !logs.is_dir() {
            return Err(OrganizeError::NoOperationLog { logs_dir: logs });
        }
        let _lock = DirectoryLock::acquire(&logs)?;

        // Chosen under the lock so a run finishing meanwhile is not skipped.
        let log_path = find_latest_operation_log(base_path)?
            .ok_or(OrganizeError::NoOperationLog { logs_dir: logs })?;

        let operation_log = OperationLog::load(&log_path)?;
        log::info!(
            "Undoing {} moves recorded in {}",
            operation_log.len(),
            log_path.display()
        );

        let mut report = UndoReport::new(log_path);
        for (destination, original) in operation_log.entries() {
            match Self::restore_file(&destination, &original) {
                Ok(()) => {
                    log::info!(
                        "Moved '{}' back to '{}'",
                        destination.display(),
                        original.display()
                    );
                    report.restored_files += 1;
                }
                Err(RestoreFailure::Missing) => {
                    log::warn!(
                        "File '{}' not found; cannot undo its move",
                        destination.display()
                    );
                    report
                        .skipped_files
                        .push((destination, "File not found at expected location".to_string()));
                }
                Err(RestoreFailure::Io(reason)) => {
                    log::warn!("Could not restore '{}': {}", destination.display(), reason);
                    report.failed_restores.push((destination, reason));
                }
            }
        }

        operation_log.delete()?;
        log::info!("Operation log {} removed", report.log_path.display());

        Self::remove_empty_category_folders(base_path, &mut report);
        Ok(report)
    }

    /// Moves `destination` back to `original`.
    ///
    /// A file that has since appeared at `original` is renamed aside with a
    /// timestamp suffix rather than overwritten.
    fn restore_file(destination: &Path, original: &Path) -> Result<(), RestoreFailure> {
        if fs::symlink_metadata(destination).is_err() {
            return Err(RestoreFailure::Missing);
        }

        if let Some(parent) = original.parent()
            && !parent.is_dir()
        {
            fs::create_dir_all(parent).map_err(|e| {
                RestoreFailure::Io(format!("Could not recreate {}: {}", parent.display(), e))
            })?;
        }

        if fs::symlink_metadata(original).is_ok() {
            let backup_path = Self::generate_backup_path(original);
            fs::rename(original, &backup_path).map_err(|e| {
                RestoreFailure::Io(format!("Could not back up conflicting file: {}", e))
            })?;
            log::warn!(
                "'{}' was occupied; kept the existing file as '{}'",
                original.display(),
                backup_path.display()
            );
        }

        fs::rename(destination, original)
            .map_err(|e| RestoreFailure::Io(format!("Failed to restore file: {}", e)))
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        match original_path.parent() {
            Some(parent) => parent.join(backup_name),
            None => PathBuf::from(backup_name),
        }
    }

    /// Removes every known category folder under `base_path` that is empty.
    ///
    /// Folders holding anything, including files the user added after
    /// organizing, are left alone.
    fn remove_empty_category_folders(base_path: &Path, report: &mut UndoReport) {
        for category in all_categories() {
            let folder = base_path.join(category);
            if !folder.is_dir() {
                continue;
            }

            let is_empty = match fs::read_dir(&folder) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) => {
                    report.folder_errors.push((folder, e.to_string()));
                    continue;
                }
            };
            if !is_empty {
                log::debug!("Keeping non-empty folder {}", folder.display());
                continue;
            }

            match fs::remove_dir(&folder) {
                Ok(()) => {
                    log::info!("Removed empty folder: {}", folder.display());
                    report.removed_folders.push(folder);
                }
                Err(e) => {
                    log::warn!("Could not remove folder {}: {}", folder.display(), e);
                    report.folder_errors.push((folder, e.to_string()));
                }
            }
        }
    }
}

enum RestoreFailure {
    Missing,
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompiledFilters;
    use crate::file_organizer::FileOrganizer;
    use crate::operation_log::ensure_logs_dir;
    use crate::run_stamp::RunStamp;
    use std::fs;
    use tempfile::TempDir;

    fn stamp(value: &str) -> RunStamp {
        RunStamp::parse(value).expect("valid stamp")
    }

    fn write_log(base_path: &Path, value: &str, entries: &[(PathBuf, PathBuf)]) -> PathBuf {
        ensure_logs_dir(base_path).expect("Failed to create Logs");
        let mut log = OperationLog::open(base_path, &stamp(value)).expect("Failed to open log");
        for (destination, original) in entries {
            log.record(destination, original);
        }
        log.save().expect("Failed to save log");
        log.path().to_path_buf()
    }

    #[test]
    fn test_undo_no_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = UndoManager::undo(temp_dir.path());
        assert!(matches!(result, Err(OrganizeError::NoOperationLog { .. })));
        assert!(!logs_dir(temp_dir.path()).exists());
    }

    #[test]
    fn test_undo_with_empty_logs_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let logs = ensure_logs_dir(temp_dir.path()).unwrap();

        let result = UndoManager::undo(temp_dir.path());
        assert!(matches!(result, Err(OrganizeError::NoOperationLog { .. })));
        assert!(!logs.join(crate::lock::LOCK_FILE_NAME).exists());
    }

    #[test]
    fn test_undo_fails_while_locked() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("PNG")).unwrap();
        fs::write(base_path.join("PNG").join("a.png"), "a").unwrap();
        let log_path = write_log(
            base_path,
            "2025-03-08_14-05",
            &[(base_path.join("PNG").join("a.png"), base_path.join("a.png"))],
        );
        let _held = DirectoryLock::acquire(&logs_dir(base_path)).unwrap();

        let result = UndoManager::undo(base_path);

        assert!(matches!(result, Err(OrganizeError::DirectoryLocked { .. })));
        assert!(log_path.exists());
        assert!(base_path.join("PNG").join("a.png").exists());
        assert!(!base_path.join("a.png").exists());
    }

    #[test]
    fn test_undo_single_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let organized = FileOrganizer::organize(
            base_path,
            &stamp("2025-03-08_14-05"),
            &CompiledFilters::accept_all(),
        )
        .expect("Failed to organize");
        let moved_file = base_path.join("Text").join("test.txt");
        assert!(moved_file.exists());

        let report = UndoManager::undo(base_path).expect("Undo failed");

        assert_eq!(report.restored_files, 1);
        assert!(report.is_complete_success());
        assert_eq!(report.log_path, organized.log_path);
        assert!(!report.log_path.exists());
        assert!(file_path.exists());
        assert!(!base_path.join("Text").exists());
        assert_eq!(report.removed_folders, vec![base_path.join("Text")]);
    }

    #[test]
    fn test_undo_uses_latest_log_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("PNG")).unwrap();
        fs::create_dir(base_path.join("Text")).unwrap();
        fs::write(base_path.join("PNG").join("old.png"), "old").unwrap();
        fs::write(base_path.join("Text").join("new.txt"), "new").unwrap();

        let older = write_log(
            base_path,
            "2025-03-08_09-00",
            &[(base_path.join("PNG/old.png"), base_path.join("old.png"))],
        );
        write_log(
            base_path,
            "2025-03-08_10-00",
            &[(base_path.join("Text/new.txt"), base_path.join("new.txt"))],
        );

        let report = UndoManager::undo(base_path).unwrap();
        assert_eq!(report.restored_files, 1);
        assert!(base_path.join("new.txt").exists());
        assert!(base_path.join("PNG").join("old.png").exists());
        assert!(older.exists());
    }

    #[test]
    fn test_undo_with_file_name_conflict() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "original content").expect("Failed to write file");

        FileOrganizer::organize(
            base_path,
            &stamp("2025-03-08_14-05"),
            &CompiledFilters::accept_all(),
        )
        .expect("Failed to organize");

        // A new file now sits where the organized one came from
        fs::write(&file_path, "new content").expect("Failed to create conflict");

        let report = UndoManager::undo(base_path).expect("Undo failed");
        assert_eq!(report.restored_files, 1);
        assert!(report.failed_restores.is_empty());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original content");

        let backups: Vec<_> = fs::read_dir(base_path)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("test.txt.bak."))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "new content");
    }

    #[test]
    fn test_undo_with_missing_file_still_deletes_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let log_path = write_log(
            base_path,
            "2025-03-08_14-05",
            &[(
                base_path.join("Text").join("nonexistent.txt"),
                base_path.join("nonexistent.txt"),
            )],
        );

        let report = UndoManager::undo(base_path).expect("Undo failed");

        assert_eq!(report.restored_files, 0);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(report.total_processed(), 1);
        assert!(!report.is_complete_success());
        assert!(!log_path.exists());
    }

    #[test]
    fn test_undo_recreates_missing_original_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("PDF")).unwrap();
        fs::write(base_path.join("PDF").join("r.pdf"), "pdf").unwrap();
        let original = base_path.join("gone").join("r.pdf");
        write_log(
            base_path,
            "2025-03-08_14-05",
            &[(base_path.join("PDF").join("r.pdf"), original.clone())],
        );

        let report = UndoManager::undo(base_path).unwrap();
        assert_eq!(report.restored_files, 1);
        assert!(original.exists());
    }

    #[test]
    fn test_undo_keeps_non_empty_and_unrelated_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("MP3")).unwrap();
        fs::create_dir(base_path.join("JPEG")).unwrap();
        fs::write(base_path.join("JPEG").join("mine.jpg"), "user").unwrap();
        fs::create_dir(base_path.join("Projects")).unwrap();
        write_log(base_path, "2025-03-08_14-05", &[]);

        let report = UndoManager::undo(base_path).unwrap();

        assert!(!base_path.join("MP3").exists());
        assert!(base_path.join("JPEG").join("mine.jpg").exists());
        assert!(base_path.join("Projects").is_dir());
        assert!(base_path.join("Logs").is_dir());
        assert_eq!(report.removed_folders, vec![base_path.join("MP3")]);
    }

    #[test]
    fn test_undo_invalid_log_leaves_it_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let logs = ensure_logs_dir(base_path).unwrap();
        let log_path = logs.join("operation_log_2025-03-08_14-05.json");
        fs::write(&log_path, "not json").unwrap();

        let result = UndoManager::undo(base_path);
        assert!(matches!(result, Err(OrganizeError::InvalidLogFormat { .. })));
        assert!(log_path.exists());
    }

    #[test]
    fn test_undo_invalid_base_path() {
        let result = UndoManager::undo(Path::new("/non/existent/path"));
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }
}
