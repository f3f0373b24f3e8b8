//! Output formatting and styling module.
//!
//! All user-facing notifications of the CLI go through [`OutputFormatter`],
//! so styling stays consistent between organize, dry-run and undo.

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Prints styled notifications, progress bars and count tables.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message with a green check mark.
    ///
    /// ```no_run
    /// use typesort::output::OutputFormatter;
    /// OutputFormatter::success("File organization complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {message}", "✓".green());
    }

    /// Prints an error notification to stderr, entirely in red.
    pub fn error(message: &str) {
        eprintln!("{}", format!("✗ {message}").red());
    }

    pub fn warning(message: &str) {
        println!("{} {message}", "⚠".yellow());
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{message}");
    }

    /// Prints a bold heading preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a message prefixed with `[DRY RUN]`, in yellow.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {message}").yellow());
    }

    /// Progress bar for `total` file moves; the message shows the current file.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        ProgressBar::new(total).with_style(style)
    }

    /// Prints how many files went into each category folder, with a total.
    ///
    /// ```no_run
    /// use typesort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let counts = BTreeMap::from([("PDF".to_string(), 15), ("PNG".to_string(), 8)]);
    /// OutputFormatter::summary_table(&counts);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>) {
        let rows: Vec<(&str, usize)> = category_counts
            .iter()
            .map(|(category, count)| (category.as_str(), *count))
            .collect();
        Self::count_table("SUMMARY", "Category", &rows, true);
    }

    /// Prints restored, skipped and failed counts of an undo run.
    pub fn undo_table(restored: usize, skipped: usize, failed: usize) {
        Self::count_table(
            "UNDO SUMMARY",
            "Outcome",
            &[("Restored", restored), ("Skipped", skipped), ("Failed", failed)],
            false,
        );
    }

    fn count_table(title: &str, label: &str, rows: &[(&str, usize)], with_total: bool) {
        Self::header(title);

        let width = rows
            .iter()
            .map(|(name, _)| name.chars().count())
            .chain([label.len(), "Total".len()])
            .max()
            .unwrap_or_default();
        let rule = "-".repeat(width + 10);

        println!("{:<width$} | {}", label.bold(), "Files".bold());
        println!("{rule}");
        for (name, count) in rows {
            println!("{name:<width$} | {}", Self::count_cell(*count));
        }

        if with_total {
            let total: usize = rows.iter().map(|(_, count)| count).sum();
            println!("{rule}");
            println!("{:<width$} | {}", "Total".bold(), Self::count_cell(total).bold());
        }
    }

    fn count_cell(count: usize) -> ColoredString {
        let noun = if count == 1 { "file" } else { "files" };
        format!("{count} {noun}").green()
    }
}
