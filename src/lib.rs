//! # batchzip Core Library
//!
//! Batch archiving engine: every regular file in an input folder becomes its
//! own AES-256 encrypted, deflate-compressed zip in an output folder. Files
//! whose archive is newer than the source are skipped, the remaining work is
//! spread over a small thread pool, and a `files-list.json` manifest records
//! what was produced.
//!
//! ## Key Modules
//!
//! - [`batch`]: the run-scoped state object and the end-to-end pipeline.
//! - [`planner`]: directory validation and the pending task list.
//! - [`workers`]: sequential/parallel scheduling and per-task execution.
//! - [`archive`]: the scoped output container around the `zip` codec.
//! - [`stats`]: lock-free counters and the summary report.
//! - [`manifest`]: the list of produced archives for the gallery front-end.
//!
//! ## Examples
//!
//! ```no_run
//! use batchzip::batch::{BatchConfig, BatchRun};
//! use batchzip::console::Console;
//!
//! let config = BatchConfig::new("input", "output", "s3cret")?.with_threads(4);
//! let outcome = BatchRun::new(config, Console::stdout()).process_all()?;
//! assert!(outcome.is_success());
//! # Ok::<(), batchzip::ArchiverError>(())
//! ```

pub mod archive;
pub mod batch;
pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod console;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod mime;
pub mod planner;
pub mod stats;
pub mod timestamps;
pub mod workers;

pub use error::ArchiverError;
