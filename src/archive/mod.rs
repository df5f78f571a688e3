//! # Per-file Encrypted Container
//!
//! Every output is a ZIP container with exactly one entry: the source bytes
//! under the bare source file name, deflated at the maximum level and sealed
//! with WinZip AES-256. The `zip` crate does the compression and the
//! authenticated encryption; this module owns the file lifecycle around it.
//!
//! [`ArchiveHandle`] is the only way to produce a container. Bytes go to a
//! temporary file next to the destination; [`ArchiveHandle::finish`] renames
//! it into place. A dropped handle only removes its temporary file, so an
//! archive from an earlier run survives a failed rebuild.

use crate::ArchiverError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

/// Highest level accepted for deflate.
pub const MAX_DEFLATE_LEVEL: i64 = 9;

const BUFFER_SIZE: usize = 64 * 1024; // 64 KiB

/// Which compression level the entry was actually written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelApplied {
    Maximum,
    /// The codec refused the maximum level; the entry used its default.
    CodecDefault,
}

fn entry_options(password: &str, level: Option<i64>) -> FileOptions<'_, ()> {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(level)
        .with_aes_encryption(AesMode::Aes256, password)
}

/// Scoped ownership of one output container.
pub struct ArchiveHandle {
    path: PathBuf,
    writer: Option<ZipWriter<BufWriter<NamedTempFile>>>,
}

impl ArchiveHandle {
    /// Start a container that will replace `path` on [`finish`](Self::finish).
    /// Nothing at `path` is touched until then.
    pub fn create(path: &Path) -> Result<Self, ArchiverError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staging = NamedTempFile::new_in(dir).map_err(|e| ArchiverError::io(e, dir))?;
        debug!(path = %path.display(), staging = %staging.path().display(), "archive started");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(ZipWriter::new(BufWriter::with_capacity(BUFFER_SIZE, staging))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut ZipWriter<BufWriter<NamedTempFile>>, ArchiverError> {
        self.writer
            .as_mut()
            .ok_or_else(|| ArchiverError::Other(format!("archive '{}' already closed", self.path.display())))
    }

    /// Add `source` as an AES-256 encrypted entry named `entry_name`.
    ///
    /// Returns the number of source bytes written and the level that was applied.
    pub fn add_encrypted_file(
        &mut self,
        entry_name: &str,
        source: &Path,
        password: &str,
    ) -> Result<(u64, LevelApplied), ArchiverError> {
        let mut reader = BufReader::with_capacity(
            BUFFER_SIZE,
            File::open(source).map_err(|e| ArchiverError::io(e, source))?,
        );
        let writer = self.writer()?;

        let level = match writer.start_file(entry_name, entry_options(password, Some(MAX_DEFLATE_LEVEL))) {
            Ok(()) => LevelApplied::Maximum,
            Err(ZipError::UnsupportedArchive(reason)) => {
                // encryption still applies; only the ratio suffers
                warn!(entry = entry_name, reason, "maximum compression level rejected, using codec default");
                writer.start_file(entry_name, entry_options(password, None))?;
                LevelApplied::CodecDefault
            }
            Err(e) => return Err(e.into()),
        };

        let written = io::copy(&mut reader, writer).map_err(|e| ArchiverError::io(e, source))?;
        debug!(entry = entry_name, bytes = written, "entry written");
        Ok((written, level))
    }

    /// Finalize the container, move it over the destination and return its
    /// size on disk.
    pub fn finish(mut self) -> Result<u64, ArchiverError> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| ArchiverError::Other(format!("archive '{}' already closed", self.path.display())))?;
        let buffered = writer.finish()?;
        let staging = buffered
            .into_inner()
            .map_err(|e| ArchiverError::io(e.into_error(), &self.path))?;
        staging.as_file().sync_all().map_err(|e| ArchiverError::io(e, &self.path))?;
        let size = staging
            .as_file()
            .metadata()
            .map_err(|e| ArchiverError::io(e, &self.path))?
            .len();
        // on failure the temporary file is dropped and removed
        staging
            .persist(&self.path)
            .map_err(|e| ArchiverError::io(e.error, &self.path))?;
        Ok(size)
    }
}

/// Write `source` into a fresh encrypted container at `destination`.
///
/// Returns the container size and the level used. On error `destination`
/// is left exactly as it was.
pub fn create_encrypted_archive(
    source: &Path,
    entry_name: &str,
    destination: &Path,
    password: &str,
) -> Result<(u64, LevelApplied), ArchiverError> {
    let mut handle = ArchiveHandle::create(destination)?;
    let (_, level) = handle.add_encrypted_file(entry_name, source, password)?;
    Ok((handle.finish()?, level))
}

/// Open a produced container and return its single entry (name, bytes).
///
/// Fails if the container holds anything but one encrypted entry, or if the
/// password does not authenticate.
pub fn read_single_entry(path: &Path, password: &str) -> Result<(String, Vec<u8>), ArchiverError> {
    let file = File::open(path).map_err(|e| ArchiverError::io(e, path))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    if archive.len() != 1 {
        return Err(ArchiverError::Other(format!(
            "expected exactly one entry in '{}', found {}",
            path.display(),
            archive.len()
        )));
    }
    let mut entry = archive.by_index_decrypt(0, password.as_bytes())?;
    if !entry.encrypted() {
        return Err(ArchiverError::Other(format!("entry in '{}' is not encrypted", path.display())));
    }
    let name = entry.name().to_string();
    // the header size is untrusted; let the buffer grow with the actual data
    let mut data = Vec::new();
    entry.read_to_end(&mut data).map_err(|e| ArchiverError::io(e, path))?;
    Ok((name, data))
}
