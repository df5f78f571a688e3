//! Run statistics shared by all worker threads.
//!
//! Every counter is its own atomic; no cross-counter transaction is needed
//! because a task touches `total`/`input_bytes` once when it is claimed and
//! then exactly one terminal outcome (processed + output bytes, or failed).

use crate::common::format_bytes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free aggregate counters for one batch run.
#[derive(Debug)]
pub struct RunStats {
    total_files: AtomicU64,
    processed_files: AtomicU64,
    skipped_files: AtomicU64,
    failed_files: AtomicU64,
    input_bytes: AtomicU64,
    output_bytes: AtomicU64,
    start_time: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            total_files: AtomicU64::new(0),
            processed_files: AtomicU64::new(0),
            skipped_files: AtomicU64::new(0),
            failed_files: AtomicU64::new(0),
            input_bytes: AtomicU64::new(0),
            output_bytes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a task as claimed by a worker.
    pub fn record_claimed(&self, input_size: u64) {
        self.total_files.fetch_add(1, Ordering::Relaxed);
        self.input_bytes.fetch_add(input_size, Ordering::Relaxed);
    }

    pub fn record_processed(&self, output_size: u64) {
        self.output_bytes.fetch_add(output_size, Ordering::Relaxed);
        self.processed_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self, count: u64) {
        self.skipped_files.fetch_add(count, Ordering::Relaxed);
    }

    pub fn total_files(&self) -> u64 {
        self.total_files.load(Ordering::Relaxed)
    }

    pub fn processed_files(&self) -> u64 {
        self.processed_files.load(Ordering::Relaxed)
    }

    pub fn skipped_files(&self) -> u64 {
        self.skipped_files.load(Ordering::Relaxed)
    }

    pub fn failed_files(&self) -> u64 {
        self.failed_files.load(Ordering::Relaxed)
    }

    pub fn input_bytes(&self) -> u64 {
        self.input_bytes.load(Ordering::Relaxed)
    }

    pub fn output_bytes(&self) -> u64 {
        self.output_bytes.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Snapshot the counters into a report. Call once all workers have returned.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_files: self.total_files(),
            processed_files: self.processed_files(),
            skipped_files: self.skipped_files(),
            failed_files: self.failed_files(),
            input_bytes: self.input_bytes(),
            output_bytes: self.output_bytes(),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Final, immutable view of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_files: u64,
    pub processed_files: u64,
    pub skipped_files: u64,
    pub failed_files: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed_files > 0
    }

    /// `1 - output/input`, or `None` when no input bytes were recorded.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.input_bytes == 0 {
            return None;
        }
        Some(1.0 - self.output_bytes as f64 / self.input_bytes as f64)
    }

    /// Input bytes per second of wall-clock time, or `None` for a zero-length run.
    pub fn throughput(&self) -> Option<f64> {
        let millis = self.elapsed.as_millis();
        if millis == 0 {
            return None;
        }
        Some(self.input_bytes as f64 / (millis as f64 / 1000.0))
    }
}

/// The console report. Line labels are parsed by the front-end.
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Processing Summary ===")?;
        writeln!(f, "Files processed: {}", self.processed_files)?;
        writeln!(f, "Files skipped: {}", self.skipped_files)?;
        writeln!(f, "Files failed: {}", self.failed_files)?;
        writeln!(f, "Total files: {}", self.total_files)?;

        if self.processed_files == 0 {
            return Ok(());
        }
        writeln!(f, "\n=== Compression Statistics ===")?;
        writeln!(f, "Total input size: {}", format_bytes(self.input_bytes))?;
        writeln!(f, "Total output size: {}", format_bytes(self.output_bytes))?;
        if let Some(ratio) = self.compression_ratio() {
            writeln!(f, "Overall compression: {:.1}%", ratio * 100.0)?;
        }
        writeln!(f, "Processing time: {} ms", self.elapsed.as_millis())?;
        if let Some(bps) = self.throughput() {
            writeln!(f, "Throughput: {}/s", format_bytes(bps as u64))?;
        }
        Ok(())
    }
}
