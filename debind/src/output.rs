use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

use crate::batch::BatchSummary;
use crate::diagnostics::{Diagnostic, Severity};

/// Create a progress bar with file count.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
///
/// # Panics
///
/// Panics if the progress style template is invalid (should never happen with hardcoded template).
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    // In test mode, return a hidden progress bar to avoid polluting test output
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("rewriting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick(); // Force initial draw
    pb
}

/// Print one diagnostic line, colored by severity.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_diagnostic(writer: &mut impl Write, diagnostic: &Diagnostic) -> std::io::Result<()> {
    let tag = match diagnostic.severity {
        Severity::Info => "info".cyan(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Error => "error".red().bold(),
    };
    writeln!(
        writer,
        "{tag}: {}: {}",
        diagnostic.subject.bold(),
        diagnostic.message
    )
}

/// Print the diagnostics that matter at the chosen verbosity.
///
/// Warnings and errors always print; info lines only under `verbose`.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_diagnostics(
    writer: &mut impl Write,
    diagnostics: &[Diagnostic],
    verbose: bool,
) -> std::io::Result<()> {
    for diagnostic in diagnostics {
        if verbose || diagnostic.severity != Severity::Info {
            print_diagnostic(writer, diagnostic)?;
        }
    }
    Ok(())
}

/// Print the batch summary as a styled table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_table(
    writer: &mut impl Write,
    summary: &BatchSummary,
) -> std::io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Processed"),
            Cell::new("Rewritten").fg(Color::Green),
            Cell::new("Unchanged"),
            Cell::new("Failed").fg(Color::Red),
        ]);
    table.add_row(vec![
        Cell::new(summary.processed()),
        Cell::new(summary.changed),
        Cell::new(summary.unchanged),
        Cell::new(summary.failed),
    ]);
    writeln!(writer, "{table}")
}

/// Print the one-line summary used in quiet mode.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_line(writer: &mut impl Write, summary: &BatchSummary) -> std::io::Result<()> {
    let failed = if summary.failed == 0 {
        summary.failed.to_string().green()
    } else {
        summary.failed.to_string().red().bold()
    };
    writeln!(
        writer,
        "{} files processed, {} rewritten, {} failed",
        summary.processed(),
        summary.changed.to_string().bold(),
        failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;

    #[test]
    fn diagnostics_respect_verbosity() {
        let mut sink = DiagnosticSink::new();
        sink.info("A.java", "processed");
        sink.error("B.java", "no insertion point");

        let mut quiet = Vec::new();
        print_diagnostics(&mut quiet, sink.events(), false).unwrap();
        let quiet = String::from_utf8(quiet).unwrap();
        assert!(!quiet.contains("A.java"));
        assert!(quiet.contains("B.java"));

        let mut verbose = Vec::new();
        print_diagnostics(&mut verbose, sink.events(), true).unwrap();
        let verbose = String::from_utf8(verbose).unwrap();
        assert!(verbose.contains("A.java"));
    }

    #[test]
    fn summary_table_renders_counts() {
        let summary = BatchSummary {
            changed: 3,
            unchanged: 2,
            failed: 1,
        };
        let mut out = Vec::new();
        print_summary_table(&mut out, &summary).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Rewritten"));
        assert!(out.contains('6'));
    }

    #[test]
    fn summary_line_shows_totals() {
        let summary = BatchSummary {
            changed: 1,
            unchanged: 0,
            failed: 0,
        };
        let mut out = Vec::new();
        print_summary_line(&mut out, &summary).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("1 files processed"));
    }
}
