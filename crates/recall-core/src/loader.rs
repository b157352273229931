//! Turns raw records into a [`Corpus`].
//!
//! Decoding goes through `serde_json::Value` first so that only the two
//! accepted shapes (one record object, or an array of record objects) get
//! through. Every other shape is `MalformedSource`.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::DocumentStore;
use crate::types::{Corpus, RawRecord};

/// Load every record the store holds, one document per record, input order kept.
pub fn load<S: DocumentStore + ?Sized>(store: &S) -> Result<Corpus> {
    let records = store.read_records()?;
    let corpus = Corpus::from_records(&records);
    debug!(source = %store.describe(), documents = corpus.len(), "loaded corpus");
    Ok(corpus)
}

/// Decode a JSON payload into a corpus.
pub fn load_str(raw: &str) -> Result<Corpus> {
    Ok(Corpus::from_records(&decode_records(raw)?))
}

/// Strictly decode a JSON payload into records.
pub fn decode_records(raw: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| Error::MalformedSource(format!("invalid JSON: {e}")))?;
    match value {
        Value::Array(items) => items.into_iter().enumerate().map(|(i, item)| decode_record(item, i)).collect(),
        Value::Object(map) => Ok(vec![decode_record(Value::Object(map), 0)?]),
        other => Err(Error::MalformedSource(format!(
            "expected a record object or an array of records, found {}",
            kind(&other)
        ))),
    }
}

fn decode_record(item: Value, position: usize) -> Result<RawRecord> {
    if !item.is_object() {
        return Err(Error::MalformedSource(format!("record {position}: expected an object, found {}", kind(&item))));
    }
    serde_json::from_value(item).map_err(|e| Error::MalformedSource(format!("record {position}: {e}")))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
