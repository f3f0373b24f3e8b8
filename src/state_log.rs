//! Snapshot of a directory's contents taken before it is organized.
//!
//! The snapshot is an audit aid only: undo never reads it and nothing deletes
//! it automatically.

use crate::error::{OrganizeError, OrganizeResult};
use crate::lock::LOCK_FILE_NAME;
use crate::operation_log::ensure_logs_dir;
use crate::run_stamp::RunStamp;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name prefix of initial-state logs. Files with this prefix are left out
/// of later snapshots.
pub const INITIAL_STATE_PREFIX: &str = "logFile_initialState";

/// Returns the path of the initial-state log for `stamp`.
pub fn initial_state_path(base_path: &Path, stamp: &RunStamp) -> PathBuf {
    crate::operation_log::logs_dir(base_path).join(format!("{INITIAL_STATE_PREFIX}_{stamp}.txt"))
}

/// Writes `Logs/logFile_initialState_<stamp>.txt` listing every file under
/// `base_path`, recursively, one absolute path per line.
///
/// Returns the path of the written log.
pub fn log_initial_state(base_path: &Path, stamp: &RunStamp) -> OrganizeResult<PathBuf> {
    OrganizeError::check_base_path(base_path)?;
    ensure_logs_dir(base_path)?;

    let log_path = initial_state_path(base_path, stamp);
    let write_failed = |source| OrganizeError::LogWriteFailed {
        path: log_path.clone(),
        source,
    };

    // Collect before creating the log so the new file is never listed.
    let files = snapshot_files(base_path);

    let mut writer = BufWriter::new(File::create(&log_path).map_err(write_failed)?);
    writeln!(writer, "Initial State of {}:", base_path.display()).map_err(write_failed)?;
    writeln!(writer).map_err(write_failed)?;
    for file in &files {
        writeln!(writer, "{}", file.display()).map_err(write_failed)?;
    }
    writer.flush().map_err(write_failed)?;

    log::info!(
        "Initial state of {} ({} files) logged to {}",
        base_path.display(),
        files.len(),
        log_path.display()
    );
    Ok(log_path)
}

fn snapshot_files(base_path: &Path) -> Vec<PathBuf> {
    WalkDir::new(base_path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry during snapshot: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            !name.starts_with(INITIAL_STATE_PREFIX) && name != LOCK_FILE_NAME
        })
        .map(|entry| entry.into_path())
        .collect()
}
