/// File organization system for moving files into category directories.
///
/// This module scans the immediate entries of a target directory, classifies
/// each regular file by extension, moves it into `<target>/<category>/` and
/// records every move in the run's operation log so it can be undone.
use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_category::standard_map;
use crate::lock::DirectoryLock;
use crate::operation_log::{OperationLog, ensure_logs_dir};
use crate::run_stamp::RunStamp;
use crate::state_log::log_initial_state;
use std::fs;
use std::path::{Path, PathBuf};

/// A single file move performed during an organize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// The category folder the file was moved to.
    pub category: String,
}

/// A file that would be moved, as computed by [`FileOrganizer::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub file_name: String,
    pub category: &'static str,
}

/// Files an organize run would move and files it leaves alone.
#[derive(Debug, Default)]
pub struct OrganizePlan {
    /// Moves in file name order.
    pub moves: Vec<PlannedMove>,
    /// Files left in place, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Outcome of a completed organize run.
#[derive(Debug)]
pub struct OrganizeReport {
    /// The operation log written by this run.
    pub log_path: PathBuf,
    /// Moves performed by this call, in the order they happened.
    pub operations: Vec<Operation>,
    /// Files left in place, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Initial-state snapshot, when one was requested.
    pub initial_state: Option<OrganizeResult<PathBuf>>,
}

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Computes which loose files of `base_path` would be moved where.
    ///
    /// Only regular files directly inside `base_path` are considered;
    /// directories, including `Logs` and existing category folders, and
    /// symlinks are never touched. Nothing on disk is changed.
    pub fn plan(base_path: &Path, filters: &CompiledFilters) -> OrganizeResult<OrganizePlan> {
        OrganizeError::check_base_path(base_path)?;

        let entries = fs::read_dir(base_path).map_err(|source| OrganizeError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source,
        })?;

        let mut plan = OrganizePlan::default();
        for entry in entries.flatten() {
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            if !is_file {
                continue;
            }

            let source = entry.path();
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping {}: file name is not valid UTF-8", source.display());
                plan.skipped
                    .push((source, "file name is not valid UTF-8".to_string()));
                continue;
            };

            if filters.is_config_file(&source) {
                log::debug!("Skipping {}: configuration file in use", source.display());
                plan.skipped
                    .push((source, "configuration file in use".to_string()));
                continue;
            }

            if !filters.should_include(&source) {
                log::debug!("Skipping {}: excluded by filter rules", source.display());
                plan.skipped
                    .push((source, "excluded by filter rules".to_string()));
                continue;
            }

            let category = standard_map().classify(&file_name);
            plan.moves.push(PlannedMove {
                source,
                file_name,
                category,
            });
        }

        plan.moves.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        plan.skipped.sort();
        Ok(plan)
    }

    /// Organizes every loose file of `base_path` into category folders.
    ///
    /// The operation log for `stamp` is extended if a run with the same stamp
    /// already wrote one. The log is saved after every move, so if a move
    /// fails the error is returned and the moves done so far stay undoable.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use typesort::config::CompiledFilters;
    /// use typesort::file_organizer::FileOrganizer;
    /// use typesort::run_stamp::RunStamp;
    /// use std::path::Path;
    ///
    /// let report = FileOrganizer::organize(
    ///     Path::new("/path/to/downloads"),
    ///     &RunStamp::now(),
    ///     &CompiledFilters::accept_all(),
    /// );
    /// match report {
    ///     Ok(report) => println!("Moved {} files", report.operations.len()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(
        base_path: &Path,
        stamp: &RunStamp,
        filters: &CompiledFilters,
    ) -> OrganizeResult<OrganizeReport> {
        Self::organize_with_progress(base_path, stamp, filters, false, |_| {})
    }

    /// Same as [`FileOrganizer::organize`], calling `on_move` after each
    /// file has been moved and logged.
    ///
    /// With `log_state`, the initial-state snapshot is written once the
    /// directory lock is held. A failed snapshot does not stop the run; its
    /// error is returned in [`OrganizeReport::initial_state`].
    pub fn organize_with_progress<F>(
        base_path: &Path,
        stamp: &RunStamp,
        filters: &CompiledFilters,
        log_state: bool,
        mut on_move: F,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(&Operation),
    {
        OrganizeError::check_base_path(base_path)?;
        let logs_dir = ensure_logs_dir(base_path)?;
        let _lock = DirectoryLock::acquire(&logs_dir)?;

        let initial_state = log_state.then(|| {
            let snapshot = log_initial_state(base_path, stamp);
            if let Err(e) = &snapshot {
                log::warn!("Initial state was not logged: {}", e);
            }
            snapshot
        });

        let mut operation_log = OperationLog::open(base_path, stamp)?;
        let plan = Self::plan(base_path, filters)?;
        log::info!(
            "Organizing {} files in {}",
            plan.moves.len(),
            base_path.display()
        );

        let mut operations = Vec::with_capacity(plan.moves.len());
        for planned in &plan.moves {
            let operation = Self::move_to_category_with_record(
                base_path,
                &planned.source,
                planned.category,
                &mut operation_log,
            )?;
            operation_log.save()?;
            on_move(&operation);
            operations.push(operation);
        }

        operation_log.save()?;
        log::info!("Operation log saved to {}", operation_log.path().display());

        Ok(OrganizeReport {
            log_path: operation_log.path().to_path_buf(),
            operations,
            skipped: plan.skipped,
            initial_state,
        })
    }

    /// Moves a file into its category directory and records the move in
    /// `operation_log` (in memory; the caller saves it).
    ///
    /// If the category directory doesn't exist, it is created. If the
    /// destination name is already taken, on disk or by an earlier entry of
    /// the same log, a ` (n)` suffix is added before the extension so no file
    /// is overwritten and every log key stays unique.
    pub fn move_to_category_with_record(
        base_path: &Path,
        file_path: &Path,
        category_dir_name: &str,
        operation_log: &mut OperationLog,
    ) -> OrganizeResult<Operation> {
        let category_path = base_path.join(category_dir_name);
        if !category_path.is_dir() {
            fs::create_dir(&category_path).map_err(|source| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.clone(),
                    source,
                }
            })?;
            log::debug!("Created category folder {}", category_path.display());
        }

        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|_| file_path.to_str().is_some())
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: category_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file path is not valid UTF-8",
                ),
            })?;

        let destination_path = Self::unique_destination(&category_path, file_name, operation_log);
        if destination_path.file_name().and_then(|n| n.to_str()) != Some(file_name) {
            log::warn!(
                "{} already exists, using {}",
                category_path.join(file_name).display(),
                destination_path.display()
            );
        }

        fs::rename(file_path, &destination_path).map_err(|source| {
            OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: destination_path.clone(),
                source,
            }
        })?;
        operation_log.record(&destination_path, file_path);
        log::info!("Moved '{}' to '{}'", file_name, category_path.display());

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            category: category_dir_name.to_string(),
        })
    }

    /// Picks `dir/file_name`, or `dir/<stem> (n).<ext>` for the smallest `n`
    /// whose path is free both on disk and in `operation_log`.
    fn unique_destination(dir: &Path, file_name: &str, operation_log: &OperationLog) -> PathBuf {
        let is_free =
            |path: &Path| fs::symlink_metadata(path).is_err() && !operation_log.contains(path);

        let candidate = dir.join(file_name);
        if is_free(&candidate) {
            return candidate;
        }

        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let extension = name.extension().and_then(|e| e.to_str());

        (1..)
            .map(|n| match extension {
                Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
                None => dir.join(format!("{stem} ({n})")),
            })
            .find(|path| is_free(path))
            .unwrap_or(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation_log::logs_dir;
    use std::fs;
    use tempfile::TempDir;

    fn stamp() -> RunStamp {
        RunStamp::parse("2025-03-08_14-05").expect("valid stamp")
    }

    fn empty_log(base_path: &Path) -> OperationLog {
        ensure_logs_dir(base_path).expect("Failed to create Logs");
        OperationLog::open(base_path, &stamp()).expect("Failed to open log")
    }

    #[test]
    fn test_move_to_category_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let mut log = empty_log(base_path);

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let operation =
            FileOrganizer::move_to_category_with_record(base_path, &file_path, "Text", &mut log)
                .expect("Failed to move file");

        let category_dir = base_path.join("Text");
        assert!(category_dir.is_dir());
        assert!(!file_path.exists());
        assert_eq!(operation.new_path, category_dir.join("test.txt"));
        assert!(operation.new_path.exists());
        assert!(log.contains(&operation.new_path));
    }

    #[test]
    fn test_move_to_category_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let mut log = empty_log(base_path);

        let category_dir = base_path.join("PNG");
        fs::create_dir(&category_dir).expect("Failed to create category directory");
        let file_path = base_path.join("test.png");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        FileOrganizer::move_to_category_with_record(base_path, &file_path, "PNG", &mut log)
            .expect("Failed to move file");

        assert!(!file_path.exists());
        assert!(category_dir.join("test.png").exists());
    }

    #[test]
    fn test_move_to_category_suffixes_taken_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let mut log = empty_log(base_path);

        let category_dir = base_path.join("PNG");
        fs::create_dir(&category_dir).unwrap();
        fs::write(category_dir.join("a.png"), "already here").unwrap();
        fs::write(category_dir.join("a (1).png"), "also here").unwrap();
        let file_path = base_path.join("a.png");
        fs::write(&file_path, "new").unwrap();

        let operation =
            FileOrganizer::move_to_category_with_record(base_path, &file_path, "PNG", &mut log)
                .unwrap();

        assert_eq!(operation.new_path, category_dir.join("a (2).png"));
        assert_eq!(fs::read_to_string(category_dir.join("a.png")).unwrap(), "already here");
        assert_eq!(fs::read_to_string(&operation.new_path).unwrap(), "new");
    }

    #[test]
    fn test_unique_destination_respects_log_keys() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let mut log = empty_log(base_path);
        let dir = base_path.join("Other Files");
        log.record(&dir.join("README"), &base_path.join("README"));

        let destination = FileOrganizer::unique_destination(&dir, "README", &log);
        assert_eq!(destination, dir.join("README (1)"));
    }

    #[test]
    fn test_plan_skips_directories_and_sorts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("b.txt"), "b").unwrap();
        fs::write(base_path.join("a.png"), "a").unwrap();
        fs::create_dir(base_path.join("Logs")).unwrap();
        fs::create_dir(base_path.join("projects")).unwrap();
        fs::write(base_path.join("projects").join("inner.txt"), "x").unwrap();

        let plan = FileOrganizer::plan(base_path, &CompiledFilters::accept_all()).unwrap();
        let names: Vec<_> = plan.moves.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.txt"]);
        assert_eq!(plan.moves[0].category, "PNG");
        assert_eq!(plan.moves[1].category, "Text");
        assert!(base_path.join("a.png").exists());
    }

    #[test]
    fn test_organize_writes_log_for_every_move() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.png"), "a").unwrap();
        fs::write(base_path.join("c.xyz"), "c").unwrap();

        let report =
            FileOrganizer::organize(base_path, &stamp(), &CompiledFilters::accept_all()).unwrap();

        assert_eq!(report.operations.len(), 2);
        assert_eq!(report.log_path, OperationLog::path_for(base_path, &stamp()));
        let log = OperationLog::load(&report.log_path).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains(&base_path.join("PNG").join("a.png")));
        assert!(log.contains(&base_path.join("Other Files").join("c.xyz")));
        assert!(!logs_dir(base_path).join(crate::lock::LOCK_FILE_NAME).exists());
    }

    #[test]
    fn test_organize_fails_while_locked() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.png"), "a").unwrap();
        let logs = ensure_logs_dir(base_path).unwrap();
        let _held = DirectoryLock::acquire(&logs).unwrap();

        let result = FileOrganizer::organize(base_path, &stamp(), &CompiledFilters::accept_all());
        assert!(matches!(result, Err(OrganizeError::DirectoryLocked { .. })));
        assert!(base_path.join("a.png").exists());
    }

    #[test]
    fn test_organize_locked_writes_no_initial_state() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.png"), "a").unwrap();
        let logs = ensure_logs_dir(base_path).unwrap();
        let _held = DirectoryLock::acquire(&logs).unwrap();

        let result = FileOrganizer::organize_with_progress(
            base_path,
            &stamp(),
            &CompiledFilters::accept_all(),
            true,
            |_| {},
        );

        assert!(matches!(result, Err(OrganizeError::DirectoryLocked { .. })));
        assert!(!crate::state_log::initial_state_path(base_path, &stamp()).exists());
    }

    #[test]
    fn test_organize_with_state_log_snapshots_before_moving() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.png"), "a").unwrap();

        let mut moves = 0;
        let report = FileOrganizer::organize_with_progress(
            base_path,
            &stamp(),
            &CompiledFilters::accept_all(),
            true,
            |_| moves += 1,
        )
        .unwrap();

        assert_eq!(moves, 1);
        let snapshot_path = match report.initial_state {
            Some(Ok(path)) => path,
            other => panic!("Expected a snapshot, got {:?}", other),
        };
        let snapshot = fs::read_to_string(snapshot_path).unwrap();
        assert!(snapshot.contains(base_path.join("a.png").to_str().unwrap()));
        assert!(!snapshot.contains(crate::lock::LOCK_FILE_NAME));
    }

    #[test]
    fn test_organize_invalid_base_path() {
        let result = FileOrganizer::organize(
            Path::new("/non/existent/path"),
            &stamp(),
            &CompiledFilters::accept_all(),
        );
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }
}
