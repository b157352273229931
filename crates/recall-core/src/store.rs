//! File-backed and in-memory [`DocumentStore`] implementations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::loader::decode_records;
use crate::traits::DocumentStore;
use crate::types::RawRecord;

/// One JSON file holding a record object or an array of record objects.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl DocumentStore for JsonFileStore {
    fn read_records(&self) -> Result<Vec<RawRecord>> {
        if !self.path.is_file() {
            return Err(Error::SourceNotFound(self.path.display().to_string()));
        }
        let bytes = fs::read(&self.path).map_err(|e| Error::SourceNotFound(format!("{}: {e}", self.path.display())))?;
        let raw = String::from_utf8(bytes)
            .map_err(|e| Error::MalformedSource(format!("{}: not valid UTF-8: {e}", self.path.display())))?;
        decode_records(&raw).map_err(|e| match e {
            Error::MalformedSource(msg) => Error::MalformedSource(format!("{}: {msg}", self.path.display())),
            other => other,
        })
    }

    fn describe(&self) -> String { self.path.display().to_string() }
}

/// Every `*.json` file below a directory, visited in sorted path order.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn list_json_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| Error::SourceNotFound(format!("{}: {e}", self.root.display())))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}

impl DocumentStore for JsonDirStore {
    fn read_records(&self) -> Result<Vec<RawRecord>> {
        if !self.root.is_dir() {
            return Err(Error::SourceNotFound(self.root.display().to_string()));
        }
        let files = self.list_json_files()?;
        if files.is_empty() {
            warn!(dir = %self.root.display(), "no .json record files found");
        }
        let mut records = Vec::new();
        for file in files {
            let batch = JsonFileStore::new(&file).read_records()?;
            debug!(file = %file.display(), records = batch.len(), "read record file");
            records.extend(batch);
        }
        Ok(records)
    }

    fn describe(&self) -> String { format!("{}/**/*.json", self.root.display()) }
}

/// Records already held in memory, e.g. fetched from a database by the caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<RawRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<RawRecord>) -> Self { Self { records } }
}

impl DocumentStore for MemoryStore {
    fn read_records(&self) -> Result<Vec<RawRecord>> { Ok(self.records.clone()) }

    fn describe(&self) -> String { format!("memory ({} records)", self.records.len()) }
}

/// Pick a store for a path: a directory of record files or a single file.
pub fn open(path: &Path) -> Box<dyn DocumentStore> {
    if path.is_dir() {
        Box::new(JsonDirStore::new(path))
    } else {
        Box::new(JsonFileStore::new(path))
    }
}
