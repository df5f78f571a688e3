//! Main entry point for the batchzip CLI app

use std::process::ExitCode;

fn main() -> ExitCode {
    match batchzip::cli_runner::run_cli_app() {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
