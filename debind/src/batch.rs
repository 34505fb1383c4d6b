//! Batch driver applying the rewrite across many files.
//!
//! Files are processed strictly one at a time; a unit that fails to parse or
//! rewrite is reported and counted, never aborting the run. A shared
//! cancellation flag is polled between units so an interrupted batch leaves
//! every already-written file complete.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ignore::WalkBuilder;
use serde::Serialize;

use crate::constants::{DEFAULT_EXCLUDE_FOLDERS, JAVA_EXTENSION};
use crate::diagnostics::DiagnosticSink;
use crate::engine::Engine;
use crate::output::create_progress_bar;
use crate::tree::JavaTree;

/// Aggregated result of one batch run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchSummary {
    /// Files that referenced the framework and were rewritten.
    pub changed: usize,
    /// Files inspected but left byte-identical.
    pub unchanged: usize,
    /// Files that could not be read, parsed, or written back.
    pub failed: usize,
}

impl BatchSummary {
    /// Total number of files inspected.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.changed + self.unchanged + self.failed
    }
}

/// Options controlling one batch run.
#[derive(Debug, Default, Clone)]
pub struct BatchOptions {
    /// Rewrite in memory only; never write files back.
    pub dry_run: bool,
}

/// Collect every eligible Java file under the given paths.
///
/// Directories are walked with gitignore rules applied; explicit file paths
/// are taken as-is. Excluded folder names drop whole subtrees.
#[must_use]
pub fn collect_java_files(paths: &[PathBuf], exclude_folders: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            if path.extension().and_then(|e| e.to_str()) == Some(JAVA_EXTENSION) {
                files.push(path.clone());
            }
            continue;
        }

        let excluded: Vec<String> = DEFAULT_EXCLUDE_FOLDERS
            .iter()
            .map(|s| (*s).to_owned())
            .chain(exclude_folders.iter().cloned())
            .collect();
        let walker = WalkBuilder::new(path)
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !excluded.iter().any(|e| e == name))
            })
            .build();
        for entry in walker.flatten() {
            let p = entry.path();
            if entry.file_type().is_some_and(|t| t.is_file())
                && p.extension().and_then(|e| e.to_str()) == Some(JAVA_EXTENSION)
            {
                files.push(p.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Run the rewrite over the collected files.
///
/// Diagnostics for every unit accumulate on `sink`; the summary counts are
/// what callers turn into an exit code.
pub fn run(
    files: &[PathBuf],
    engine: &Engine<'_>,
    options: &BatchOptions,
    cancelled: &AtomicBool,
    sink: &mut DiagnosticSink,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let pb = create_progress_bar(files.len() as u64);

    for path in files {
        if cancelled.load(Ordering::Relaxed) {
            sink.warning("batch", "cancelled, remaining files untouched");
            break;
        }
        match rewrite_file(path, engine, options, sink) {
            Ok(true) => summary.changed += 1,
            Ok(false) => summary.unchanged += 1,
            Err(err) => {
                summary.failed += 1;
                sink.error(path.display().to_string(), err.to_string());
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    summary
}

/// Rewrite one file; `Ok(true)` means its content changed on disk (or would
/// have, under dry-run).
fn rewrite_file(
    path: &Path,
    engine: &Engine<'_>,
    options: &BatchOptions,
    sink: &mut DiagnosticSink,
) -> anyhow::Result<bool> {
    let unit_name = path.display().to_string();
    let source = fs::read_to_string(path)?;
    let mut tree = JavaTree::parse(&source)?;

    if !engine.rewrite_unit(&mut tree, &unit_name, sink)? {
        return Ok(false);
    }

    let commit = tree.commit()?;
    if !commit.changed {
        return Ok(false);
    }
    if !options.dry_run {
        fs::write(path, commit.source)?;
    }
    Ok(true)
}
