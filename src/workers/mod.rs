//! Worker pool and scheduling.
//!
//! The planner hands over an immutable task list, already sorted
//! largest-first. Workers share one atomic cursor: each one does
//! `fetch_add(1)` to claim the next index and processes that task, until the
//! cursor runs past the end. Nothing is ever re-enqueued, so there are no
//! per-worker queues and no rebalancing; the size ordering does the load
//! balancing. Small batches run on the calling thread instead.

use crate::archive::{create_encrypted_archive, LevelApplied};
use crate::common::{format_bytes, FileTask};
use crate::console::Console;
use crate::manifest::ManifestEntry;
use crate::stats::RunStats;
use crate::ArchiverError;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, warn};

/// Upper bound on worker threads regardless of core count.
pub const MAX_THREADS: usize = 8;

/// Tasks at least this large make a batch worth parallelizing.
pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Worker count: the requested number (0 = detected cores), capped at
/// [`MAX_THREADS`], never zero.
pub fn optimal_thread_count(requested: usize) -> usize {
    let wanted = if requested == 0 { num_cpus::get() } else { requested };
    wanted.clamp(1, MAX_THREADS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Parallel { workers: usize },
}

/// Parallel only for two or more tasks, and only if one of them is large or
/// there are at least as many tasks as workers.
pub fn choose_strategy(tasks: &[FileTask], workers: usize, large_file_threshold: u64) -> Strategy {
    if tasks.len() < 2 {
        return Strategy::Sequential;
    }
    let has_large = tasks.iter().any(|t| t.size >= large_file_threshold);
    if !(has_large || tasks.len() >= workers) {
        return Strategy::Sequential;
    }
    match workers.min(tasks.len()) {
        0 | 1 => Strategy::Sequential,
        n => Strategy::Parallel { workers: n },
    }
}

/// Run-scoped state every task reports into.
pub struct TaskContext<'a> {
    pub password: &'a str,
    pub stats: &'a RunStats,
    pub manifest: &'a Mutex<Vec<ManifestEntry>>,
    pub console: &'a Console,
}

/// Execute every task with the given strategy. Returns once all of them are done.
pub fn execute(tasks: &[FileTask], strategy: Strategy, ctx: &TaskContext<'_>) -> Result<(), ArchiverError> {
    match strategy {
        Strategy::Sequential => {
            for (index, task) in tasks.iter().enumerate() {
                run_task(index, tasks.len(), task, ctx);
            }
            Ok(())
        }
        Strategy::Parallel { workers } => run_parallel(tasks, workers, ctx),
    }
}

fn run_parallel(tasks: &[FileTask], workers: usize, ctx: &TaskContext<'_>) -> Result<(), ArchiverError> {
    let cursor = AtomicUsize::new(0);

    let panicked = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let cursor = &cursor;
                s.spawn(move || {
                    let mut done = 0usize;
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(task) = tasks.get(index) else { break };
                        run_task(index, tasks.len(), task, ctx);
                        done += 1;
                    }
                    debug!(worker_id, tasks = done, "worker finished");
                })
            })
            .collect();

        handles.into_iter().filter_map(|h| h.join().err()).count()
    });

    if panicked > 0 {
        return Err(ArchiverError::Other("A worker thread panicked".into()));
    }
    Ok(())
}

fn progress_prefix(index: usize, total: usize) -> String {
    if total > 1 {
        format!("[{}/{}] ", index + 1, total)
    } else {
        String::new()
    }
}

/// Share of the input saved by compression, in percent.
pub fn file_compression_percent(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    (1.0 - output_size as f64 / input_size as f64) * 100.0
}

/// Claim, process and record one task. Never panics and never returns an
/// error: every task ends as exactly one of processed or failed.
fn run_task(index: usize, total: usize, task: &FileTask, ctx: &TaskContext<'_>) {
    ctx.stats.record_claimed(task.size);
    let prefix = progress_prefix(index, total);
    let source_name = task.source_name();
    let zip_name = task.destination_name();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        create_encrypted_archive(&task.source, &source_name, &task.destination, ctx.password)
    }));

    let error = match outcome {
        Ok(Ok((output_size, level))) => {
            ctx.stats.record_processed(output_size);
            ctx.manifest
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(ManifestEntry::new(zip_name.as_str(), &source_name));
            let note = match level {
                LevelApplied::Maximum => "",
                LevelApplied::CodecDefault => " [default level]",
            };
            ctx.console.line(format!(
                "{prefix}✅ {zip_name} ({} → {}, {:.1}% compressed){note}",
                format_bytes(task.size),
                format_bytes(output_size),
                file_compression_percent(task.size, output_size),
            ));
            return;
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => "worker panicked while archiving".to_string(),
    };

    ctx.stats.record_failed();
    warn!(file = %source_name, error = %error, "task failed");
    ctx.console.line(format!("{prefix}❌ Failed: {source_name}: {error}"));
}
