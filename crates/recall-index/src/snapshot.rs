//! On-disk copy of a built index keyed by the corpus content hash.
//!
//! A snapshot is only reused when its format version and content hash match
//! the corpus being indexed; anything else reads as a miss and the caller
//! rebuilds. Writes go to a uniquely named temp file in the same directory and are
//! persisted into place.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use recall_core::error::{Error, Result};
use recall_core::types::Corpus;

use crate::index::IndexState;
use crate::vectorizer::{DocumentVector, VocabularyModel};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
	version: u32,
	content_hash: &'a str,
	model: &'a VocabularyModel,
	vectors: &'a [DocumentVector],
}

#[derive(Deserialize)]
struct SnapshotFile {
	version: u32,
	content_hash: String,
	model: VocabularyModel,
	vectors: Vec<DocumentVector>,
}

pub fn save(path: &Path, state: &IndexState) -> Result<()> {
	let snapshot = SnapshotRef {
		version: FORMAT_VERSION,
		content_hash: state.content_hash(),
		model: state.model(),
		vectors: state.vectors(),
	};
	let bytes = serde_json::to_vec(&snapshot).map_err(|e| Error::Snapshot(format!("encode: {e}")))?;
	let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
	fs::create_dir_all(dir).map_err(|e| Error::Snapshot(format!("{}: {e}", dir.display())))?;
	// unique temp name per writer; concurrent saves never share a half-written file
	let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::Snapshot(format!("{}: {e}", dir.display())))?;
	tmp.write_all(&bytes).map_err(|e| Error::Snapshot(format!("{}: {e}", tmp.path().display())))?;
	tmp.persist(path).map_err(|e| Error::Snapshot(format!("{}: {}", path.display(), e.error)))?;
	debug!(path = %path.display(), "snapshot written");
	Ok(())
}

/// Restore the index for `corpus` from `path`, or `Ok(None)` if the file is
/// absent, unreadable as a snapshot, or built from different content.
pub fn load(path: &Path, corpus: &Corpus) -> Result<Option<IndexState>> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(Error::Snapshot(format!("{}: {e}", path.display()))),
	};
	let file: SnapshotFile = match serde_json::from_slice(&bytes) {
		Ok(file) => file,
		Err(e) => {
			warn!(path = %path.display(), "unreadable snapshot: {e}");
			return Ok(None);
		}
	};
	if file.version != FORMAT_VERSION {
		debug!(found = file.version, expected = FORMAT_VERSION, "snapshot format changed");
		return Ok(None);
	}
	let content_hash = corpus.content_hash();
	if file.content_hash != content_hash || file.vectors.len() != corpus.len() || file.model.corpus_size() != corpus.len() {
		debug!(path = %path.display(), "snapshot is stale");
		return Ok(None);
	}
	Ok(Some(IndexState::from_parts(corpus.clone(), file.model, file.vectors, content_hash)))
}
