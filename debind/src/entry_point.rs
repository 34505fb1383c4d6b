use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use crate::batch::{self, BatchOptions, BatchSummary};
use crate::cli::Cli;
use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::engine::Engine;
use crate::listener::{FixedListener, ListenerClass, ListenerLookup, ProjectListenerScan};

/// JSON payload emitted under `--json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a BatchSummary,
    diagnostics: &'a [Diagnostic],
}

/// Runs the rewriter with the given arguments.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if output writing fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run debind with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if output writing fails.
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["debind".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => {
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    // Let clap print help/version as intended, but captured by redirect
                    write!(writer, "{e}")?;
                    writer.flush()?;
                    return Ok(0);
                }
                _ => {
                    eprint!("{e}");
                    return Ok(1);
                }
            }
        }
    };

    let targets: Vec<PathBuf> = if let Some(root) = cli.paths.root.clone() {
        vec![root]
    } else if cli.paths.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.paths.clone()
    };

    for target in &targets {
        if !target.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                target.display()
            );
            return Ok(1);
        }
    }

    // Load config from the first target path
    let config = Config::load_from_path(&targets[0]);

    let mut exclude_folders = config.debind.exclude_folders.clone().unwrap_or_default();
    exclude_folders.extend(cli.exclude_folders.clone());

    let verbose = cli.output.verbose || config.debind.verbose.unwrap_or(false);
    if verbose && !cli.output.json {
        eprintln!("[VERBOSE] debind v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Targets: {targets:?}");
        eprintln!("[VERBOSE] Excludes: {exclude_folders:?}");
        if let Some(path) = &config.config_file_path {
            eprintln!("[VERBOSE] Config: {}", path.display());
        }
    }

    let files = batch::collect_java_files(&targets, &exclude_folders);
    if files.is_empty() {
        writeln!(writer, "No Java sources found.")?;
        return Ok(0);
    }

    if files.len() > 1 && !cli.yes && !cli.dry_run && !confirm(files.len())? {
        writeln!(writer, "Aborted.")?;
        return Ok(0);
    }

    let listener_override = cli
        .listener_class
        .as_deref()
        .or(config.debind.listener_class.as_deref());
    let lookup: Box<dyn ListenerLookup> = match listener_override {
        Some(qualified) => Box::new(FixedListener(Some(ListenerClass::from_qualified(qualified)))),
        None => Box::new(ProjectListenerScan::new(&targets[0])),
    };
    let engine = Engine::new(lookup.as_ref());

    let options = BatchOptions {
        dry_run: cli.dry_run,
    };
    let mut sink = DiagnosticSink::new();
    let cancelled = AtomicBool::new(false);
    let summary = batch::run(&files, &engine, &options, &cancelled, &mut sink);

    if cli.output.json {
        let report = JsonReport {
            summary: &summary,
            diagnostics: sink.events(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        crate::output::print_diagnostics(writer, sink.events(), verbose)?;
        if cli.output.quiet {
            crate::output::print_summary_line(writer, &summary)?;
        } else {
            crate::output::print_summary_table(writer, &summary)?;
        }
        if cli.dry_run {
            writeln!(writer, "Dry run: no files were written.")?;
        }
    }
    writer.flush()?;

    Ok(i32::from(summary.failed > 0))
}

/// Ask for confirmation before touching more than one file.
fn confirm(count: usize) -> Result<bool> {
    eprint!("Rewrite {count} files in place? [y/N] ");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
