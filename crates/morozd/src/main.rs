//! Service host binary for the Moroz HTTP server.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match morozd::run_service() {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(error) => {
            tracing::error!(target: "morozd::process", error = %error, "service host failed");
            // Telemetry may not be installed yet, so the console gets a copy.
            let _ = writeln!(io::stderr().lock(), "morozd: {error}");
            ExitCode::from(morozd::FATAL_EXIT_CODE)
        }
    }
}
