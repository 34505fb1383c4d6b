use clap::{Args, Parser};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.debind.toml):
  Create this file in your project root to set defaults.

  [debind]
  # Replacement for the framework's debounce listener. When set, the
  # project-wide class search is skipped.
  listener_class = \"com.example.ui.DebouncingOnClickListener\"

  # Path filters
  exclude_folders = [\"build\", \"generated\"]

  # Output
  verbose = false            # Print per-file diagnostics
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output the batch summary as raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output (shows per-file diagnostics).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary line.
    #[arg(long)]
    pub quiet: bool,
}

/// Shared path arguments (mutually exclusive paths/root).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Paths to rewrite (files or directories).
    /// Can be a single directory, multiple files, or a mix of both.
    /// When no paths are provided, defaults to the current directory.
    /// Cannot be used with --root.
    #[arg(conflicts_with = "root")]
    pub paths: Vec<PathBuf>,

    /// Project root to rewrite.
    /// Use this instead of positional paths when running from a different
    /// directory; the root also scopes the replacement listener search.
    #[arg(long, conflicts_with = "paths")]
    pub root: Option<PathBuf>,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "debind - Remove view-binding annotations from Java sources, replacing them with plain findViewById code",
    long_about = None,
    after_help = CONFIG_HELP
)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct Cli {
    /// Global path options (paths vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Preview the rewrite without writing any file back.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt before rewriting multiple files.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Fully qualified replacement listener class (overrides config and the
    /// project-wide search).
    #[arg(long)]
    pub listener_class: Option<String>,

    /// Folders to exclude from the source walk.
    #[arg(long, alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paths_and_root_conflict() {
        let result = Cli::try_parse_from(["debind", "src", "--root", "project"]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_are_off() {
        let cli = Cli::try_parse_from(["debind"]).unwrap();
        assert!(cli.paths.paths.is_empty());
        assert!(!cli.dry_run);
        assert!(!cli.yes);
        assert!(cli.listener_class.is_none());
    }
}
