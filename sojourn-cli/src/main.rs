//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error;
use std::process::ExitCode;

use sojourn_cli::CliError;

fn main() -> ExitCode {
    match sojourn_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported on stderr before exiting"
)]
fn report(err: &CliError) {
    eprintln!("sojourn: {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        eprintln!("  caused by: {inner}");
        cause = inner.source();
    }
}
