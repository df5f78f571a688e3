//! The manifest of produced archives (`files-list.json`).
//!
//! A JSON array of `{ "name": ..., "type": ... }` records, one per archive
//! produced in this run, in completion order. The gallery front-end treats it
//! as its file list. An empty run never touches an existing manifest.

use crate::mime::media_type_for;
use crate::ArchiverError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const DEFAULT_MANIFEST_NAME: &str = "files-list.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Archive file name as it appears in the output directory.
    pub name: String,
    /// Media type inferred from the *source* file's extension.
    #[serde(rename = "type")]
    pub media_type: String,
}

impl ManifestEntry {
    pub fn new(archive_name: impl Into<String>, source_name: &str) -> Self {
        Self {
            name: archive_name.into(),
            media_type: media_type_for(source_name).to_string(),
        }
    }
}

pub struct ManifestWriter {
    path: PathBuf,
}

impl ManifestWriter {
    pub fn new(output_dir: &Path, file_name: &str) -> Self {
        Self { path: output_dir.join(file_name) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `entries`, replacing the previous manifest atomically.
    ///
    /// Returns `Ok(None)` without writing when `entries` is empty.
    pub fn write(&self, entries: &[ManifestEntry]) -> Result<Option<PathBuf>, ArchiverError> {
        if entries.is_empty() {
            info!(path = %self.path.display(), "no files processed, manifest left untouched");
            return Ok(None);
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir).map_err(|e| ArchiverError::io(e, dir))?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            entries.serialize(&mut ser)?;
            out.write_all(b"\n").map_err(|e| ArchiverError::io(e, &self.path))?;
            out.flush().map_err(|e| ArchiverError::io(e, &self.path))?;
        }
        tmp.as_file().sync_all().map_err(|e| ArchiverError::io(e, &self.path))?;
        tmp.persist(&self.path)
            .map_err(|e| ArchiverError::io(e.error, &self.path))?;

        info!(path = %self.path.display(), entries = entries.len(), "manifest written");
        Ok(Some(self.path.clone()))
    }
}

/// Parse a manifest; rejects records with fields other than `name` and `type`.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ArchiverError> {
    let file = File::open(path).map_err(|e| ArchiverError::io(e, path))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_entry_type_from_source_extension() {
        let entry = ManifestEntry::new("scan.PDF.zip", "scan.PDF");
        assert_eq!(entry.media_type, "application/pdf");
        let entry = ManifestEntry::new("blob.zip", "blob");
        assert_eq!(entry.media_type, "application/octet-stream");
    }

    #[test]
    fn test_writes_name_and_type_records() {
        let dir = tempdir().unwrap();
        let writer = ManifestWriter::new(dir.path(), DEFAULT_MANIFEST_NAME);
        let entries = vec![
            ManifestEntry::new("a.txt.zip", "a.txt"),
            ManifestEntry::new("b.png.zip", "b.png"),
        ];
        let written = writer.write(&entries).unwrap();
        assert_eq!(written.as_deref(), Some(writer.path()));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(writer.path()).unwrap()).unwrap();
        let records = raw.as_array().unwrap();
        assert_eq!(records.len(), 2);
        for record in records {
            let obj = record.as_object().unwrap();
            assert_eq!(obj.len(), 2);
            assert!(obj["name"].is_string());
            assert!(obj["type"].is_string());
        }
        assert_eq!(read_manifest(writer.path()).unwrap(), entries);
    }

    #[test]
    fn test_escapes_quotes_backslashes_and_control_chars() {
        let dir = tempdir().unwrap();
        let writer = ManifestWriter::new(dir.path(), DEFAULT_MANIFEST_NAME);
        let tricky = "we\"ird\\na\tme\u{1}.txt.zip";
        writer.write(&[ManifestEntry::new(tricky, "x.txt")]).unwrap();

        let text = fs::read_to_string(writer.path()).unwrap();
        assert!(text.contains(r#"we\"ird\\na\tme\u0001.txt.zip"#));
        assert_eq!(read_manifest(writer.path()).unwrap()[0].name, tricky);
    }

    #[test]
    fn test_empty_run_keeps_previous_manifest() {
        let dir = tempdir().unwrap();
        let writer = ManifestWriter::new(dir.path(), DEFAULT_MANIFEST_NAME);
        fs::write(writer.path(), "[{\"name\":\"old.zip\",\"type\":\"text/plain\"}]").unwrap();

        assert_eq!(writer.write(&[]).unwrap(), None);
        let kept = read_manifest(writer.path()).unwrap();
        assert_eq!(kept[0].name, "old.zip");
    }

    #[test]
    fn test_extra_fields_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, r#"[{"name":"a","type":"b","size":1}]"#).unwrap();
        assert!(read_manifest(&path).is_err());
    }
}
