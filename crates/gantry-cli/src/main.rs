//! CLI entrypoint for the gantry container controller.
//!
//! The binary delegates to [`gantry_cli::run`], which loads configuration,
//! parses command-line arguments, and drives the configured container through
//! its lifecycle operations.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    gantry_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
