//! Core library for the debind source rewriter.
//!
//! This library removes view-binding and click-binding annotations from Java
//! sources, replacing them with plain `findViewById` code: a mutable syntax
//! tree over each compilation unit, an annotation-driven rewrite engine, and
//! a batch driver that applies the rewrite across a project.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module for the batch driver applying the rewrite across many files.
pub mod batch;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Module for the diagnostics side channel between engine and callers.
pub mod diagnostics;

/// Module containing the annotation-driven rewrite engine.
/// This includes anchor resolution, binding collection, code synthesis, and
/// framework cleanup.
pub mod engine;

/// Module defining the entry point logic shared by every binary.
pub mod entry_point;

/// Module for resolving the replacement debounce-listener class.
pub mod listener;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Module containing the mutable Java syntax tree.
/// This is responsible for parsing units and rendering mutations back to
/// source text.
pub mod tree;
