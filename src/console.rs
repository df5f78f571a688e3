//! Line-atomic console output.
//!
//! Workers report results concurrently; each call here writes whole lines
//! under one lock so a reader (terminal or GUI pipe) never sees two results
//! spliced together. Diagnostics go through `tracing` instead.

use std::io::{self, Write};
use std::sync::Mutex;

enum Sink {
    Stdout,
    Buffer(Vec<u8>),
}

pub struct Console {
    sink: Mutex<Sink>,
}

impl Console {
    pub fn stdout() -> Self {
        Self { sink: Mutex::new(Sink::Stdout) }
    }

    /// Capture output in memory instead of printing it.
    pub fn buffered() -> Self {
        Self { sink: Mutex::new(Sink::Buffer(Vec::new())) }
    }

    /// Write `text` followed by a newline as one unit.
    pub fn line(&self, text: impl AsRef<str>) {
        self.write_block(&format!("{}\n", text.as_ref()));
    }

    /// Write a multi-line block as one unit.
    pub fn write_block(&self, text: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                // a closed pipe must not take the batch down
                let _ = out.write_all(text.as_bytes()).and_then(|_| out.flush());
            }
            Sink::Buffer(buf) => buf.extend_from_slice(text.as_bytes()),
        }
    }

    /// Captured text so far; empty for the stdout sink.
    pub fn contents(&self) -> String {
        match &*self.sink.lock().unwrap_or_else(|e| e.into_inner()) {
            Sink::Stdout => String::new(),
            Sink::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}
