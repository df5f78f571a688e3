//! CLI runner shared by the binary and by callers that want the exact
//! console behaviour of the command-line tool.

use crate::batch::{BatchConfig, BatchOutcome, BatchRun};
use crate::cli;
use crate::console::Console;
use crate::{logging, ArchiverError};
use tracing::info;

fn print_header(console: &Console, config: &BatchConfig) {
    console.write_block(&format!(
        "=== High-Performance File Zipper with Password Protection ===\n\
         Source folder: {}\n\
         Output folder: {}\n\
         Encryption: AES-256\n\
         Max threads: {}\n\
         Password: [USER PROVIDED]\n\n",
        config.input_dir.display(),
        config.output_dir.display(),
        config.threads,
    ));
}

/// Parse arguments, run one batch on stdout, and report how it went.
///
/// Returns `Err` only for fatal startup errors; per-file failures are in the outcome.
pub fn run_cli_app() -> Result<BatchOutcome, ArchiverError> {
    let args = cli::run();
    logging::init(&args.log_level);
    let config = args.into_config()?;

    let console = Console::stdout();
    print_header(&console, &config);
    console.line("Scanning files...");

    info!(version = env!("CARGO_PKG_VERSION"), threads = config.threads, "starting batch");
    let output_dir = config.output_dir.clone();
    let run = BatchRun::new(config, console);
    let outcome = run.process_all()?;

    if outcome.is_success() {
        run.console().write_block(&format!(
            "\n🎉 Process completed successfully!\n\
             Check the '{}' folder for individual zip files.\n\
             Each zip file is protected with AES-256 encryption.\n",
            output_dir.display()
        ));
    } else {
        run.console().line("\n❌ Process completed with errors!");
    }
    Ok(outcome)
}
