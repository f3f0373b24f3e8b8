use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use typesort::cli::{OrganizeCommand, RunOptions, run_cli_with_options};
use typesort::output::OutputFormatter;

/// Sort the loose files of a directory into per-type folders, and undo it.
#[derive(Debug, Parser)]
#[command(name = "typesort", version, about)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move every loose file into a folder named after its type.
    Organize {
        /// Directory to organize.
        directory: PathBuf,
        /// Show what would be moved without changing anything.
        #[arg(long)]
        dry_run: bool,
        /// Do not write the initial-state snapshot before organizing.
        #[arg(long)]
        no_state_log: bool,
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
        /// Filter configuration file (TOML).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Reverse the most recent organize run.
    Undo {
        /// Directory that was organized.
        directory: PathBuf,
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let (command, directory, options) = match args.command {
        Command::Organize {
            directory,
            dry_run,
            no_state_log,
            yes,
            config,
        } => (
            OrganizeCommand::Organize {
                dry_run,
                log_state: !no_state_log,
            },
            directory,
            RunOptions {
                assume_yes: yes,
                config_path: config,
                stamp: None,
            },
        ),
        Command::Undo { directory, yes } => (
            OrganizeCommand::Undo,
            directory,
            RunOptions {
                assume_yes: yes,
                ..Default::default()
            },
        ),
    };

    // Operation logs record absolute paths.
    let directory = std::path::absolute(&directory)
        .with_context(|| format!("Could not resolve directory {}", directory.display()))?;

    log::debug!("Running {:?} on {}", command, directory.display());
    if let Err(message) = run_cli_with_options(command, &directory, &options) {
        OutputFormatter::error(&message);
        std::process::exit(1);
    }
    Ok(())
}
