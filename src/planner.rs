//! # Task Planning
//!
//! Turns an input directory into the ordered list of [`FileTask`]s that still
//! need an archive:
//!
//! 1. list the output directory once and remember every `*.zip` name;
//! 2. walk the input directory (flat, regular files only) and keep a file if
//!    it has no archive yet, or if it is strictly newer than its archive;
//! 3. sort largest-first so parallel workers pick up the long tasks early.

use crate::common::{zip_file_name, FileTask};
use crate::timestamps::TimestampCache;
use crate::ArchiverError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Result of a planning pass.
#[derive(Debug, Default)]
pub struct Plan {
    /// Pending work, largest source first.
    pub tasks: Vec<FileTask>,
    /// Input files whose archive is already up to date.
    pub skipped: u64,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

/// Create the output directory if needed and check the input directory.
///
/// Any error here is fatal for the run.
pub fn validate_directories(input_dir: &Path, output_dir: &Path) -> Result<(), ArchiverError> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir).map_err(|source| ArchiverError::OutputDir {
            source,
            path: output_dir.to_path_buf(),
        })?;
        info!(path = %output_dir.display(), "created output folder");
    } else if !output_dir.is_dir() {
        return Err(ArchiverError::OutputDir {
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a directory"),
            path: output_dir.to_path_buf(),
        });
    }
    // a read-only output folder would otherwise fail every task one by one
    tempfile::tempfile_in(output_dir).map_err(|source| ArchiverError::OutputDir {
        source,
        path: output_dir.to_path_buf(),
    })?;

    if !input_dir.exists() {
        return Err(ArchiverError::InputMissing(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(ArchiverError::InputNotDirectory(input_dir.to_path_buf()));
    }
    Ok(())
}

/// Names of the archives already present in `output_dir`.
fn existing_archives(output_dir: &Path) -> Result<HashSet<String>, ArchiverError> {
    let mut names = HashSet::new();
    if !output_dir.exists() {
        return Ok(names);
    }
    for entry in fs::read_dir(output_dir).map_err(|e| ArchiverError::io(e, output_dir))? {
        let entry = entry.map_err(|e| ArchiverError::io(e, output_dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".zip") && entry.path().is_file() {
            names.insert(name);
        }
    }
    Ok(names)
}

pub struct TaskPlanner<'a> {
    cache: &'a TimestampCache,
}

impl<'a> TaskPlanner<'a> {
    pub fn new(cache: &'a TimestampCache) -> Self {
        Self { cache }
    }

    /// Compute the pending work set. Never fails: scan errors are logged and
    /// yield an empty plan.
    pub fn plan(&self, input_dir: &Path, output_dir: &Path) -> Plan {
        match self.scan(input_dir, output_dir) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "error scanning input directory");
                Plan::default()
            }
        }
    }

    fn scan(&self, input_dir: &Path, output_dir: &Path) -> Result<Plan, ArchiverError> {
        if !input_dir.is_dir() {
            return Err(ArchiverError::InputNotDirectory(input_dir.to_path_buf()));
        }
        let existing = existing_archives(output_dir)?;
        let mut plan = Plan::default();

        for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // the directory itself could not be listed
                Err(e) if e.depth() == 0 => return Err(ArchiverError::io(e.into(), input_dir)),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let source = entry.path();
            let zip_name = zip_file_name(&entry.file_name().to_string_lossy());
            let destination = output_dir.join(&zip_name);

            let needs_build =
                !existing.contains(&zip_name) || self.cache.is_input_newer(source, &destination);
            if !needs_build {
                debug!(file = %zip_name, "up to date");
                plan.skipped += 1;
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!(path = %source.display(), error = %e, "cannot read file size, skipping");
                    continue;
                }
            };
            plan.tasks.push(FileTask::new(source.to_path_buf(), destination, size));
        }

        // Largest first; ties by path so the order is stable across runs.
        plan.tasks
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.source.cmp(&b.source)));
        Ok(plan)
    }
}
