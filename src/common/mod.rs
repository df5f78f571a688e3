//! Common utilities and types module.
// Shared task type, byte formatting, output naming.

use std::path::PathBuf;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// One unit of work: compress and encrypt `source` into `destination`.
///
/// Built by the planner, consumed exactly once by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub size: u64,
}

impl FileTask {
    pub fn new(source: PathBuf, destination: PathBuf, size: u64) -> Self {
        Self { source, destination, size }
    }

    /// Bare file name of the source, used as the entry name inside the archive.
    pub fn source_name(&self) -> String {
        file_name_lossy(&self.source)
    }

    pub fn destination_name(&self) -> String {
        file_name_lossy(&self.destination)
    }
}

fn file_name_lossy(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Output name for a source file: the original name with `.zip` appended,
/// so `report.pdf` becomes `report.pdf.zip`.
pub fn zip_file_name(file_name: &str) -> String {
    format!("{file_name}.zip")
}

/// Render a byte count in binary units with one decimal (`1.5 MB`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let unit_index = (((63 - bytes.leading_zeros()) / 10) as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(unit_index as i32);
    format!("{:.1} {}", value, UNITS[unit_index])
}
