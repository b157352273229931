use crate::error::Result;
use crate::types::{Document, RawRecord};

/// Read side of whatever persists raw meeting records.
pub trait DocumentStore: Send + Sync {
    fn read_records(&self) -> Result<Vec<RawRecord>>;

    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;
}

/// What prompt-assembly code depends on: ranked document text for a question.
pub trait Retriever: Send + Sync {
    fn query(&self, text: &str, top_n: usize) -> Result<Vec<Document>>;

    /// Wider lookup with the retriever's configured result count.
    fn search(&self, text: &str) -> Result<Vec<Document>>;
}
