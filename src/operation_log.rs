/// Operation logs that record where each organized file came from.
///
/// A log is a flat JSON object mapping the absolute destination path of a
/// moved file to its absolute original path. Each organize run writes to
/// `<target>/Logs/operation_log_<YYYY-MM-DD_HH-MM>.json`; undo consumes the
/// newest one and deletes it.
use crate::error::{OrganizeError, OrganizeResult};
use crate::run_stamp::RunStamp;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Name of the directory holding all log files, inside the target directory.
pub const LOGS_DIR_NAME: &str = "Logs";

/// File name prefix of operation logs.
pub const OPERATION_LOG_PREFIX: &str = "operation_log_";

static OPERATION_LOG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^operation_log_\d{4}-\d{2}-\d{2}_\d{2}-\d{2}\.json$")
        .expect("operation log pattern is valid")
});

/// Returns `<base_path>/Logs`.
pub fn logs_dir(base_path: &Path) -> PathBuf {
    base_path.join(LOGS_DIR_NAME)
}

/// Creates `<base_path>/Logs` if it does not exist and returns its path.
pub fn ensure_logs_dir(base_path: &Path) -> OrganizeResult<PathBuf> {
    let dir = logs_dir(base_path);
    fs::create_dir_all(&dir).map_err(|source| OrganizeError::DirectoryCreationFailed {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Destination → original mapping for one organize run.
#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl OperationLog {
    /// Returns the log path a run with `stamp` writes to.
    pub fn path_for(base_path: &Path, stamp: &RunStamp) -> PathBuf {
        logs_dir(base_path).join(format!("{OPERATION_LOG_PREFIX}{stamp}.json"))
    }

    /// Opens the log for `stamp`, loading it if a run with the same stamp
    /// already wrote one, otherwise starting empty. Nothing is written.
    pub fn open(base_path: &Path, stamp: &RunStamp) -> OrganizeResult<Self> {
        let path = Self::path_for(base_path, stamp);
        if path.is_file() {
            log::info!("Extending existing operation log {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self {
                path,
                entries: BTreeMap::new(),
            })
        }
    }

    /// Loads a log file from disk.
    pub fn load(path: &Path) -> OrganizeResult<Self> {
        let json_string = fs::read_to_string(path).map_err(|source| OrganizeError::LogReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let entries: BTreeMap<String, String> =
            serde_json::from_str(&json_string).map_err(|e| OrganizeError::InvalidLogFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Writes the whole log, replacing the file. Indented with four spaces.
    pub fn save(&self) -> OrganizeResult<()> {
        let write_failed = |source| OrganizeError::LogWriteFailed {
            path: self.path.clone(),
            source,
        };

        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        self.entries
            .serialize(&mut serializer)
            .map_err(|e| write_failed(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        fs::write(&self.path, buffer).map_err(write_failed)
    }

    /// Deletes the log file. A file that is already gone is not an error.
    pub fn delete(&self) -> OrganizeResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(OrganizeError::LogWriteFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Records that the file now at `destination` came from `original`.
    ///
    /// Returns `false` without recording when either path is not valid UTF-8,
    /// since such a path could not be written back faithfully.
    pub fn record(&mut self, destination: &Path, original: &Path) -> bool {
        match (destination.to_str(), original.to_str()) {
            (Some(dest), Some(orig)) => {
                self.entries.insert(dest.to_string(), orig.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, destination: &Path) -> bool {
        destination
            .to_str()
            .is_some_and(|dest| self.entries.contains_key(dest))
    }

    /// Iterates `(destination, original)` pairs in destination order.
    pub fn entries(&self) -> impl Iterator<Item = (PathBuf, PathBuf)> + '_ {
        self.entries
            .iter()
            .map(|(dest, orig)| (PathBuf::from(dest), PathBuf::from(orig)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Returns the newest operation log in `<base_path>/Logs`, if any.
///
/// Logs are ordered by file name; the embedded zero-padded stamp makes that
/// chronological. Files in `Logs` that do not match the operation log naming
/// scheme are ignored.
pub fn find_latest_operation_log(base_path: &Path) -> OrganizeResult<Option<PathBuf>> {
    let dir = logs_dir(base_path);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(OrganizeError::LogReadFailed { path: dir, source }),
    };

    let latest = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| OPERATION_LOG_NAME.is_match(name))
        .max();

    Ok(latest.map(|name| dir.join(name)))
}
