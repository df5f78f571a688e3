use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `batchzip` crate.
#[derive(Debug, Error)]
pub enum ArchiverError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io { source: std::io::Error, path: PathBuf },

    /// The archive codec rejected an operation (container creation, encryption, read-back).
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An error during serialization of the manifest.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// No password was supplied on the command line or in the environment.
    #[error("Password not provided! Please set ZIPPER_PASSWORD environment variable.")]
    MissingPassword,

    #[error("Input folder does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Input path is not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),

    /// The output directory could not be created.
    #[error("Failed to create output folder '{}': {source}", .path.display())]
    OutputDir { source: std::io::Error, path: PathBuf },

    /// A wrapper for any other error that doesn't fit the specific variants.
    #[error("{0}")]
    Other(String),
}

impl ArchiverError {
    /// Attach the offending path to an I/O error.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ArchiverError::Io { source, path: path.into() }
    }

    /// Startup errors abort the whole run before any task is attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArchiverError::MissingPassword
                | ArchiverError::InputMissing(_)
                | ArchiverError::InputNotDirectory(_)
                | ArchiverError::OutputDir { .. }
        )
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for ArchiverError {
    fn from(err: std::io::Error) -> Self {
        ArchiverError::Io { source: err, path: PathBuf::new() }
    }
}
