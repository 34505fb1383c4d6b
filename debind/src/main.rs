//! Main binary entry point for the `debind` rewriter.
//!
//! This binary simply delegates to the shared `entry_point::run_with_args()`
//! function so the CLI and library callers behave identically.

use anyhow::Result;

fn main() -> Result<()> {
    let code = debind::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
