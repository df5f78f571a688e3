//! Memoized modification times.
//!
//! The planner asks for the mtime of every input and of every existing
//! output. Entries are keyed by the path string and filled lazily. The lock
//! only guards the map; the `stat` itself runs unlocked, so two threads may
//! race to fill the same key and the last writer wins (both values are equal).

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

use tracing::debug;

#[derive(Debug, Default)]
pub struct TimestampCache {
    entries: Mutex<HashMap<String, SystemTime>>,
}

impl TimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cached(&self, key: &str) -> Option<SystemTime> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }

    fn store(&self, key: String, time: SystemTime) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, time);
    }

    /// Last-modified time of `path`, from the cache or a fresh `stat`.
    ///
    /// A miss always queries the filesystem; failures are not cached.
    pub fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        let key = path.to_string_lossy().into_owned();
        if let Some(time) = self.cached(&key) {
            return Ok(time);
        }
        let time = std::fs::metadata(path)?.modified()?;
        self.store(key, time);
        Ok(time)
    }

    /// True when `input` should be rebuilt into `output`.
    ///
    /// Anything that prevents a comparison (output absent, unreadable
    /// timestamps) counts as newer: reprocessing is preferred over skipping.
    pub fn is_input_newer(&self, input: &Path, output: &Path) -> bool {
        let input_time = match self.modified(input) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %input.display(), error = %e, "input mtime unavailable");
                return true;
            }
        };
        let output_time = match self.modified(output) {
            Ok(t) => t,
            Err(_) => return true,
        };
        input_time > output_time
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
