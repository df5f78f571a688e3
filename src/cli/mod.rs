use crate::batch::BatchConfig;
use crate::manifest::DEFAULT_MANIFEST_NAME;
use crate::workers::LARGE_FILE_THRESHOLD;
use crate::ArchiverError;
use clap::Parser;
use std::path::PathBuf;

/// Environment variable holding the archive password.
pub const PASSWORD_ENV: &str = "ZIPPER_PASSWORD";

/// Compress every file of a folder into its own AES-256 encrypted zip.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder whose files are archived (flat, not recursive).
    #[arg(short, long, env = "ZIPPER_INPUT_FOLDER", default_value = "input")]
    pub input: PathBuf,

    /// Folder receiving one `<name>.zip` per input file. Created if missing.
    #[arg(short, long, env = "ZIPPER_OUTPUT_FOLDER", default_value = "output")]
    pub output: PathBuf,

    /// Password for the archives. If not provided, read from ZIPPER_PASSWORD; there is no default.
    #[arg(long)]
    pub password: Option<String>,

    /// Number of worker threads. [0 = auto-detect based on CPU cores, capped at 8]
    #[arg(long, env = "ZIPPER_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Files at or above this size (bytes) make a batch run in parallel.
    #[arg(long, default_value_t = LARGE_FILE_THRESHOLD)]
    pub large_file_threshold: u64,

    /// File name of the manifest written into the output folder.
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    pub manifest_name: String,

    /// Log filter for diagnostics on stderr (trace, debug, info, warn, error). RUST_LOG wins.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Gets the password from the command-line option or the `ZIPPER_PASSWORD` environment variable.
///
/// Priority:
/// 1. `--password` command-line argument.
/// 2. `ZIPPER_PASSWORD` environment variable.
///
/// A missing or empty password is an error; there is no fallback.
pub fn get_password_from_opt_or_env(password_opt: Option<String>) -> Result<String, ArchiverError> {
    password_opt
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .ok_or(ArchiverError::MissingPassword)
}

impl Args {
    /// Resolve the password and build the run configuration.
    pub fn into_config(self) -> Result<BatchConfig, ArchiverError> {
        let password = get_password_from_opt_or_env(self.password)?;
        Ok(BatchConfig::new(self.input, self.output, password)?
            .with_threads(self.threads)
            .with_large_file_threshold(self.large_file_threshold)
            .with_manifest_name(self.manifest_name))
    }
}

/// Parses command-line arguments using `clap`.
pub fn run() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_password_wins() {
        assert_eq!(get_password_from_opt_or_env(Some("cli".into())).unwrap(), "cli");
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            get_password_from_opt_or_env(Some(String::new())),
            Err(ArchiverError::MissingPassword)
        ));
    }

    #[test]
    fn test_args_into_config() {
        let args = Args::try_parse_from([
            "batchzip",
            "--input",
            "in",
            "--output",
            "out",
            "--password",
            "pw",
            "--threads",
            "2",
            "--large-file-threshold",
            "42",
        ])
        .unwrap();
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.input_dir, PathBuf::from("in"));
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.threads, 2);
        assert_eq!(cfg.large_file_threshold, 42);
        assert_eq!(cfg.manifest_name, DEFAULT_MANIFEST_NAME);
    }
}
