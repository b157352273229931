//! Domain types shared by the loader, the document stores and the index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Notes attached to a meeting record: either free text or bullet lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    Text(String),
    Lines(Vec<String>),
}

impl Notes {
    /// Collapse the notes into one string; lines are joined with a single space.
    pub fn flatten(&self) -> String {
        match self {
            Notes::Text(text) => text.clone(),
            Notes::Lines(lines) => lines.join(" "),
        }
    }
}

/// A record as persisted by the document store.
///
/// - `transcript`: speech-to-text output for one meeting
/// - `summary`: generated summary of the transcript
/// - `notes`: highlighted sentences, as text or as a list of lines
///
/// Absent and `null` fields read as empty. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub notes: Option<Notes>,
}

impl RawRecord {
    pub fn new(transcript: impl Into<String>, summary: impl Into<String>, notes: Notes) -> Self {
        Self { transcript: Some(transcript.into()), summary: Some(summary.into()), notes: Some(notes) }
    }

    /// Flatten transcript, summary and notes into one searchable text blob.
    ///
    /// All three parts are joined with single spaces; a missing part is the
    /// empty string, so `{"transcript": "a", "notes": "c"}` reads `"a  c"`.
    pub fn to_document(&self) -> Document {
        let notes = self.notes.as_ref().map(Notes::flatten).unwrap_or_default();
        let parts = [self.transcript.as_deref().unwrap_or(""), self.summary.as_deref().unwrap_or(""), notes.as_str()];
        Document::new(parts.join(" "))
    }
}

/// An immutable, flattened text unit derived from one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    pub fn new(text: impl Into<String>) -> Self { Self(text.into()) }

    pub fn text(&self) -> &str { &self.0 }

    pub fn into_text(self) -> String { self.0 }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Ordered documents; a document's position is its identity for the
/// lifetime of one built index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self { Self { documents } }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().map(Document::new).collect()
    }

    pub fn from_records(records: &[RawRecord]) -> Self {
        records.iter().map(RawRecord::to_document).collect()
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn get(&self, position: usize) -> Option<&Document> { self.documents.get(position) }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> { self.documents.iter() }

    /// Hex blake3 digest over every document, length-prefixed so that
    /// `["ab", "c"]` and `["a", "bc"]` hash differently.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.documents.len() as u64).to_le_bytes());
        for doc in &self.documents {
            hasher.update(&(doc.0.len() as u64).to_le_bytes());
            hasher.update(doc.0.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self { documents: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter { self.documents.iter() }
}

/// One ranked result.
///
/// `position` indexes into the corpus the index was built from. `score` is
/// the cosine similarity to the query, in `[0, 1]`; higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub position: usize,
    pub score: f32,
}
