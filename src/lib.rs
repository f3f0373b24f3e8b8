//! typesort - sort the loose files of a directory into per-type folders
//!
//! This library classifies files by extension, moves them into category
//! subdirectories, records every move in a timestamped operation log, and
//! reverses the most recent run from that log.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod lock;
pub mod operation_log;
pub mod output;
pub mod run_stamp;
pub mod state_log;
pub mod undo;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use file_category::{ExtensionMap, FALLBACK_CATEGORY, classify};
pub use file_organizer::{FileOrganizer, Operation, OrganizeReport};
pub use operation_log::{OperationLog, find_latest_operation_log};
pub use run_stamp::RunStamp;
pub use state_log::log_initial_state;
pub use undo::{UndoManager, UndoReport};

pub use cli::{OrganizeCommand, RunOptions, run_cli, run_cli_with_options};
