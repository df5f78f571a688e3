//! One batch run: plan, archive, report, write the manifest.
//!
//! All state lives in [`BatchRun`]; nothing is process-global, so several
//! runs can execute side by side in one process.

use crate::console::Console;
use crate::manifest::{ManifestEntry, ManifestWriter, DEFAULT_MANIFEST_NAME};
use crate::planner::{validate_directories, TaskPlanner};
use crate::stats::{RunStats, RunSummary};
use crate::timestamps::TimestampCache;
use crate::workers::{self, Strategy, TaskContext, LARGE_FILE_THRESHOLD};
use crate::ArchiverError;

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};

/// Validated settings for a run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub password: String,
    /// Effective worker count, already bounded.
    pub threads: usize,
    pub large_file_threshold: u64,
    pub manifest_name: String,
}

impl BatchConfig {
    /// Settings with default threading and manifest name.
    ///
    /// Fails with [`ArchiverError::MissingPassword`] for an empty password.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Result<Self, ArchiverError> {
        let password = password.into();
        if password.is_empty() {
            return Err(ArchiverError::MissingPassword);
        }
        Ok(Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            password,
            threads: workers::optimal_thread_count(0),
            large_file_threshold: LARGE_FILE_THRESHOLD,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        })
    }

    /// Request a worker count (0 = auto); the result is capped and never zero.
    pub fn with_threads(mut self, requested: usize) -> Self {
        self.threads = workers::optimal_thread_count(requested);
        self
    }

    pub fn with_large_file_threshold(mut self, bytes: u64) -> Self {
        self.large_file_threshold = bytes;
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }
}

/// What a finished run reports back to its caller.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub summary: RunSummary,
    /// Set only when this run wrote a manifest.
    pub manifest_path: Option<PathBuf>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        !self.summary.has_failures()
    }
}

pub struct BatchRun {
    config: BatchConfig,
    stats: RunStats,
    timestamps: TimestampCache,
    manifest: Mutex<Vec<ManifestEntry>>,
    console: Console,
}

impl BatchRun {
    pub fn new(config: BatchConfig, console: Console) -> Self {
        Self {
            config,
            stats: RunStats::new(),
            timestamps: TimestampCache::new(),
            manifest: Mutex::new(Vec::new()),
            console,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the whole batch.
    ///
    /// Only startup problems (bad directories) are returned as errors;
    /// per-file failures are counted in the outcome's summary.
    pub fn process_all(&self) -> Result<BatchOutcome, ArchiverError> {
        let cfg = &self.config;
        validate_directories(&cfg.input_dir, &cfg.output_dir)?;

        let plan = TaskPlanner::new(&self.timestamps).plan(&cfg.input_dir, &cfg.output_dir);
        self.stats.record_skipped(plan.skipped);
        info!(
            tasks = plan.len(),
            skipped = plan.skipped,
            cached_timestamps = self.timestamps.len(),
            "planning done"
        );

        if plan.is_empty() {
            self.console.line("No new files to process.");
            return Ok(BatchOutcome { summary: self.stats.summary(), manifest_path: None });
        }
        self.console.line(format!("Found {} files to process", plan.len()));

        let strategy = workers::choose_strategy(&plan.tasks, cfg.threads, cfg.large_file_threshold);
        match strategy {
            Strategy::Parallel { workers } => self
                .console
                .line(format!("Using parallel processing with {workers} threads")),
            Strategy::Sequential => self.console.line("Using sequential processing"),
        }

        let ctx = TaskContext {
            password: &cfg.password,
            stats: &self.stats,
            manifest: &self.manifest,
            console: &self.console,
        };
        if let Err(e) = workers::execute(&plan.tasks, strategy, &ctx) {
            // results already recorded stay valid; report what we have
            error!(error = %e, "worker pool did not shut down cleanly");
        }

        let summary = self.stats.summary();
        self.console.write_block(&summary.to_string());

        let entries = self.manifest.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let writer = ManifestWriter::new(&cfg.output_dir, &cfg.manifest_name);
        let manifest_path = match writer.write(&entries) {
            Ok(Some(path)) => {
                self.console
                    .line(format!("📄 Generated {} with {} entries", cfg.manifest_name, entries.len()));
                Some(path)
            }
            Ok(None) => {
                self.console
                    .line(format!("No files processed, skipping {} generation.", cfg.manifest_name));
                None
            }
            Err(e) => {
                error!(error = %e, "failed to write manifest");
                self.console.line(format!("Error generating {}: {e}", cfg.manifest_name));
                None
            }
        };

        Ok(BatchOutcome { summary, manifest_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_config_rejects_empty_password() {
        assert!(matches!(BatchConfig::new("in", "out", ""), Err(ArchiverError::MissingPassword)));
    }

    #[test]
    fn test_config_thread_bounds() {
        let cfg = BatchConfig::new("in", "out", "pw").unwrap().with_threads(100);
        assert_eq!(cfg.threads, workers::MAX_THREADS);
        let cfg = cfg.with_threads(2);
        assert_eq!(cfg.threads, 2);
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        let cfg = BatchConfig::new(dir.path().join("absent"), dir.path().join("out"), "pw").unwrap();
        let run = BatchRun::new(cfg, Console::buffered());
        let err = run.process_all().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(run.stats().total_files(), 0);
    }

    #[test]
    fn test_empty_input_is_trivial_success() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("in")).unwrap();
        let cfg = BatchConfig::new(dir.path().join("in"), dir.path().join("out"), "pw").unwrap();
        let run = BatchRun::new(cfg, Console::buffered());
        let outcome = run.process_all().unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.summary.total_files, 0);
        assert!(outcome.manifest_path.is_none());
        assert!(run.console().contents().contains("No new files to process."));
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn test_failure_flag_propagates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(input.join("ok.txt"), b"fine").unwrap();
        fs::write(input.join("blocked.txt"), b"blocked").unwrap();
        // a directory squatting on the archive name makes that task fail
        fs::create_dir(output.join("blocked.txt.zip")).unwrap();

        let cfg = BatchConfig::new(&input, &output, "pw").unwrap();
        let run = BatchRun::new(cfg, Console::buffered());
        let outcome = run.process_all().unwrap();
        assert_eq!(outcome.summary.total_files, 2);
        assert_eq!(outcome.summary.processed_files, 1);
        assert_eq!(outcome.summary.failed_files, 1);
        assert!(!outcome.is_success());
        assert!(output.join("blocked.txt.zip").is_dir());
    }
}
