//! Command-line interface module for typesort.
//!
//! This module is the boundary between the user and the core operations:
//! - Validation of the target directory before anything is asked or changed
//! - Confirmation prompts
//! - Organization, dry-run preview and undo orchestration
//! - Conversion of every error into a user notification

use crate::config::{CompiledFilters, FilterConfig};
use crate::error::OrganizeError;
use crate::file_organizer::{FileOrganizer, Operation, OrganizePlan};
use crate::operation_log::{find_latest_operation_log, logs_dir};
use crate::output::OutputFormatter;
use crate::run_stamp::RunStamp;
use crate::undo::{UndoManager, UndoReport};
use dialoguer::Confirm;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// If true, show what would be moved without making changes.
        dry_run: bool,
        /// If true, snapshot the directory into an initial-state log first.
        log_state: bool,
    },
    /// Undo the most recent organization.
    Undo,
}

/// Settings for a single CLI invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip confirmation prompts.
    pub assume_yes: bool,
    /// Explicit configuration file; otherwise the usual locations are searched.
    pub config_path: Option<PathBuf>,
    /// Stamp for the run's log files; the current time when `None`.
    pub stamp: Option<RunStamp>,
}

/// Runs a command against `dir_path`, asking for confirmation interactively.
///
/// # Examples
///
/// ```no_run
/// use typesort::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// let command = OrganizeCommand::Organize { dry_run: false, log_state: true };
/// if let Err(e) = run_cli(command, Path::new("/path/to/directory")) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_options(command, dir_path, &RunOptions::default())
}

/// Runs a command with explicit options.
///
/// Errors are returned as the notification text shown to the user; callers
/// cannot and need not distinguish error kinds.
pub fn run_cli_with_options(
    command: OrganizeCommand,
    dir_path: &Path,
    options: &RunOptions,
) -> Result<(), String> {
    let result = match command {
        OrganizeCommand::Organize { dry_run: true, .. } => organize_dry_run(dir_path, options),
        OrganizeCommand::Organize {
            dry_run: false,
            log_state,
        } => organize_directory(dir_path, log_state, options),
        OrganizeCommand::Undo => undo_organization(dir_path, options),
    };
    result.map_err(|e| notification(&e))
}

/// Errors seen at the CLI boundary.
enum CliError {
    Organize(OrganizeError),
    Prompt(dialoguer::Error),
}

impl From<OrganizeError> for CliError {
    fn from(e: OrganizeError) -> Self {
        CliError::Organize(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e)
    }
}

fn notification(error: &CliError) -> String {
    match error {
        CliError::Organize(e) => format!("{}: {}", e.title(), e),
        CliError::Prompt(e) => format!("Unexpected Error: could not read confirmation: {}", e),
    }
}

fn load_filters(options: &RunOptions) -> Result<CompiledFilters, OrganizeError> {
    let config = FilterConfig::load(options.config_path.as_deref())?;
    Ok(config.compile()?)
}

fn confirm(prompt: &str, options: &RunOptions) -> Result<bool, CliError> {
    if options.assume_yes {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn organize_directory(
    base_path: &Path,
    log_state: bool,
    options: &RunOptions,
) -> Result<(), CliError> {
    OrganizeError::check_base_path(base_path)?;
    let filters = load_filters(options)?;

    if !confirm("Do you want to proceed with file organization?", options)? {
        OutputFormatter::plain("Organization cancelled. No files were moved.");
        return Ok(());
    }

    OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));
    let stamp = options.stamp.clone().unwrap_or_else(RunStamp::now);

    let planned = FileOrganizer::plan(base_path, &filters)?.moves.len();
    let pb = OutputFormatter::create_progress_bar(planned as u64);
    let result =
        FileOrganizer::organize_with_progress(base_path, &stamp, &filters, log_state, |op| {
            pb.set_message(file_name_of(&op.original_path));
            pb.inc(1);
        });

    let report = match result {
        Ok(report) => {
            pb.finish_and_clear();
            report
        }
        Err(e) => {
            pb.abandon();
            OutputFormatter::warning(
                "Files moved before the error are recorded in the operation log and can be undone.",
            );
            return Err(e.into());
        }
    };

    match &report.initial_state {
        Some(Ok(path)) => OutputFormatter::plain(&format!(
            "Initial state of {} has been logged to {}",
            base_path.display(),
            path.display()
        )),
        Some(Err(e)) => OutputFormatter::warning(&format!("{}: {}", e.title(), e)),
        None => {}
    }

    for op in &report.operations {
        OutputFormatter::plain(&format!(
            " - {} → {}/",
            file_name_of(&op.original_path),
            op.category
        ));
    }
    print_skipped(&report.skipped);

    if report.operations.is_empty() {
        OutputFormatter::plain("No files found to organize.");
    } else {
        OutputFormatter::summary_table(&category_counts(&report.operations));
    }

    OutputFormatter::plain(&format!(
        "\nOperation log saved to {}",
        report.log_path.display()
    ));
    OutputFormatter::success(&format!(
        "File organization complete. Use 'typesort undo {}' to revert changes.",
        base_path.display()
    ));
    Ok(())
}

fn organize_dry_run(base_path: &Path, options: &RunOptions) -> Result<(), CliError> {
    let filters = load_filters(options)?;
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    let OrganizePlan { moves, skipped } = FileOrganizer::plan(base_path, &filters)?;
    print_skipped(&skipped);

    if moves.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Files would be organized as follows:");
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &moves {
        OutputFormatter::plain(&format!(
            " - {}\n   → Would move to {}/",
            planned.file_name, planned.category
        ));
        *counts.entry(planned.category.to_string()).or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts);

    OutputFormatter::success("Dry run complete. No files were modified.");
    OutputFormatter::plain(&format!(
        "Run 'typesort organize {}' (without --dry-run) to execute the organization.",
        base_path.display()
    ));
    Ok(())
}

fn undo_organization(base_path: &Path, options: &RunOptions) -> Result<(), CliError> {
    OrganizeError::check_base_path(base_path)?;
    if find_latest_operation_log(base_path)?.is_none() {
        return Err(OrganizeError::NoOperationLog {
            logs_dir: logs_dir(base_path),
        }
        .into());
    }

    if !confirm("Do you want to undo the last operation?", options)? {
        OutputFormatter::plain("Undo cancelled. No files were moved.");
        return Ok(());
    }

    OutputFormatter::info("Undoing previous organization...");
    let report = UndoManager::undo(base_path)?;
    print_undo_report(&report);
    Ok(())
}

fn print_undo_report(report: &UndoReport) {
    for (path, reason) in &report.skipped_files {
        OutputFormatter::warning(&format!("Skipped {}: {}", path.display(), reason));
    }
    for (path, reason) in &report.failed_restores {
        OutputFormatter::error(&format!("Failed to restore {}: {}", path.display(), reason));
    }

    for folder in &report.removed_folders {
        OutputFormatter::plain(&format!("Removed empty folder: {}", folder.display()));
    }
    for (folder, reason) in &report.folder_errors {
        OutputFormatter::error(&format!(
            "Folder Removal Error: Could not remove folder {}: {}",
            folder.display(),
            reason
        ));
    }

    OutputFormatter::undo_table(
        report.restored_files,
        report.skipped_files.len(),
        report.failed_restores.len(),
    );
    OutputFormatter::success("Undo complete; operation log removed.");
}

fn print_skipped(skipped: &[(PathBuf, String)]) {
    for (path, reason) in skipped {
        OutputFormatter::plain(&format!("Skipping {}: {}", file_name_of(path), reason));
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Counts moved files per category folder.
fn category_counts(operations: &[Operation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for op in operations {
        *counts.entry(op.category.clone()).or_insert(0) += 1;
    }
    counts
}
